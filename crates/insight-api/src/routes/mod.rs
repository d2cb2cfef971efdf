//! API 라우트.
//!
//! # 라우트 구조
//!
//! - `/health` - 헬스 체크
//! - `/api/customize`, `/api/preferences` - 선호도 저장/조회
//! - `/api/generate`, `/api/compose` - 인사이트 생성
//! - `/api/news` - 관련 뉴스
//! - `/registration`, `/verify-otp`, `/login`, `/is_new_user`, `/get_user_info` - 인증

pub mod auth;
pub mod generate;
pub mod health;
pub mod news;
pub mod preferences;

pub use auth::auth_router;
pub use generate::generate_router;
pub use health::{health_router, HealthResponse};
pub use news::news_router;
pub use preferences::preferences_router;

use axum::Router;
use std::sync::Arc;

use crate::state::AppState;

/// 전체 API 라우터 생성.
///
/// 각 하위 라우터는 전체 경로를 직접 선언하므로 `nest` 대신 `merge`로 합칩니다.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .merge(health_router())
        .merge(preferences_router())
        .merge(generate_router())
        .merge(news_router())
        .merge(auth_router())
}

#[cfg(test)]
pub(crate) mod test_support {
    use async_trait::async_trait;
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Method, Request},
        response::Response,
    };
    use insight_provider::{GenerationProvider, GenerationRequest, ProviderError, ProviderResult};
    use serde_json::Value;
    use std::sync::Arc;

    pub fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    pub async fn body_json(response: Response) -> Value {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    /// 고정 응답(또는 고정 실패)을 돌려주는 provider.
    pub struct FixedProvider {
        name: &'static str,
        reply: Option<&'static str>,
    }

    impl FixedProvider {
        pub fn ok(name: &'static str, text: &'static str) -> Arc<Self> {
            Arc::new(Self {
                name,
                reply: Some(text),
            })
        }

        pub fn failing(name: &'static str) -> Arc<Self> {
            Arc::new(Self { name, reply: None })
        }
    }

    #[async_trait]
    impl GenerationProvider for FixedProvider {
        async fn generate(&self, _request: &GenerationRequest) -> ProviderResult<String> {
            self.reply
                .map(str::to_string)
                .ok_or(ProviderError::Api {
                    status: 503,
                    body: "unavailable".to_string(),
                })
        }

        fn name(&self) -> &'static str {
            self.name
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::create_test_state;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_all_routes_mounted() {
        let app = create_api_router().with_state(Arc::new(create_test_state()));

        for uri in ["/health", "/api/news", "/is_new_user"] {
            let response = app
                .clone()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_ne!(response.status(), StatusCode::NOT_FOUND, "{} not mounted", uri);
        }
    }
}
