//! 인사이트 생성 endpoint.
//!
//! - `POST /api/generate`: 저장된 선호도 기반 생성 (캐시 사용, provider 실패 시 대체 문구)
//! - `POST /api/compose`: 자유 프롬프트 생성 (tone/length/차트 옵션)

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use std::sync::Arc;
use validator::Validate;

use crate::error::{into_api_error, ApiErrorResponse, ApiResult};
use crate::routes::preferences::UserQuery;
use crate::services::{ComposeRequest, ComposeResponse, GenerationResult};
use crate::state::AppState;

/// 선호도 기반 인사이트 생성.
#[utoipa::path(
    post,
    path = "/api/generate",
    params(UserQuery),
    responses(
        (status = 200, description = "생성 또는 캐시 응답", body = GenerationResult),
        (status = 404, description = "선호도 없음", body = ApiErrorResponse),
        (status = 500, description = "저장소 미설정", body = ApiErrorResponse)
    ),
    tag = "generation"
)]
pub async fn generate(
    State(state): State<Arc<AppState>>,
    Query(query): Query<UserQuery>,
) -> ApiResult<Json<GenerationResult>> {
    let service = state.generation_service().map_err(into_api_error)?;
    let result = service
        .generate_for_user(query.user_id.as_deref())
        .await
        .map_err(into_api_error)?;

    Ok(Json(result))
}

/// 자유 프롬프트 생성.
#[utoipa::path(
    post,
    path = "/api/compose",
    request_body = ComposeRequest,
    responses(
        (status = 200, description = "생성 성공", body = ComposeResponse),
        (status = 400, description = "빈 프롬프트", body = ApiErrorResponse),
        (status = 500, description = "provider 미설정", body = ApiErrorResponse),
        (status = 502, description = "provider 호출 실패", body = ApiErrorResponse)
    ),
    tag = "generation"
)]
pub async fn compose(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ComposeRequest>,
) -> ApiResult<Json<ComposeResponse>> {
    request.validate().map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ApiErrorResponse::with_details(
                "INVALID_INPUT",
                "Invalid compose request",
                serde_json::to_value(&e).unwrap_or_default(),
            )),
        )
    })?;

    let service = state.generation_service().map_err(into_api_error)?;
    let response = service.compose(&request).await.map_err(into_api_error)?;

    Ok(Json(response))
}

pub fn generate_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/generate", post(generate))
        .route("/api/compose", post(compose))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{body_json, post_json, FixedProvider};
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request};
    use insight_provider::ProviderChain;
    use serde_json::json;
    use tower::ServiceExt;

    fn app(state: AppState) -> Router {
        crate::routes::preferences::preferences_router()
            .merge(generate_router())
            .with_state(Arc::new(state))
    }

    fn generate_request(user_id: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/generate?user_id={}", user_id))
            .body(Body::empty())
            .unwrap()
    }

    async fn save(app: &Router, user_id: &str) {
        let response = app
            .clone()
            .oneshot(post_json(
                "/api/customize",
                json!({"user_id": user_id, "chart_type": "line", "finance_metric": "growth", "show_news": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_generate_without_preferences_is_404() {
        let response = app(create_test_state())
            .oneshot(generate_request("ghost"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            body_json(response).await["message"],
            "Preferences not found for user"
        );
    }

    #[tokio::test]
    async fn test_generate_twice_second_is_cached() {
        let state = create_test_state()
            .with_providers(ProviderChain::new().with_fallback(FixedProvider::ok("OpenAI", "Growth is steady.")));
        let app = app(state);
        save(&app, "alice").await;

        let first = body_json(app.clone().oneshot(generate_request("alice")).await.unwrap()).await;
        let second = body_json(app.oneshot(generate_request("alice")).await.unwrap()).await;

        assert_eq!(first["cached"], false);
        assert_eq!(second["cached"], true);
        assert_eq!(first["response"], "Growth is steady.");
        assert_eq!(first["response"], second["response"]);
        assert_eq!(first["preferences"]["show_news"], true);
    }

    #[tokio::test]
    async fn test_generate_without_provider_returns_sentinel() {
        let app = app(create_test_state());
        save(&app, "bob").await;

        let response = app.oneshot(generate_request("bob")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["response"], "No AI provider configured.");
    }

    #[tokio::test]
    async fn test_generate_degraded_text_is_not_an_error() {
        let state = create_test_state()
            .with_providers(ProviderChain::new().with_primary(FixedProvider::failing("Gemini")));
        let app = app(state);
        save(&app, "carol").await;

        let response = app.oneshot(generate_request("carol")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["response"]
            .as_str()
            .unwrap()
            .starts_with("Gemini call failed:"));
    }

    #[tokio::test]
    async fn test_compose_extracts_chart_data() {
        let state = create_test_state().with_providers(ProviderChain::new().with_fallback(
            FixedProvider::ok(
                "OpenAI",
                "Revenue grew in Q2.\nCHART_JSON=[{\"label\":\"Q1\",\"value\":10},{\"label\":\"Q2\",\"value\":14}]",
            ),
        ));

        let response = app(state)
            .oneshot(post_json(
                "/api/compose",
                json!({"prompt": "How did revenue do?", "include_charts": true}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["text"], "Revenue grew in Q2.");
        assert_eq!(body["chart_data"][1]["label"], "Q2");
        assert_eq!(body["chart_data"][1]["value"], 14.0);
    }

    #[tokio::test]
    async fn test_compose_status_codes() {
        let response = app(create_test_state())
            .oneshot(post_json("/api/compose", json!({"prompt": ""})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app(create_test_state())
            .oneshot(post_json("/api/compose", json!({"prompt": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["code"], "NOT_CONFIGURED");

        let state = create_test_state()
            .with_providers(ProviderChain::new().with_fallback(FixedProvider::failing("OpenAI")));
        let response = app(state)
            .oneshot(post_json("/api/compose", json!({"prompt": "hi"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(body_json(response).await["code"], "UPSTREAM_ERROR");
    }
}
