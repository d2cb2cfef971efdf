//! 헬스 체크 endpoint.
//!
//! 의존성 상태와 무관하게 항상 200을 반환하며, 저장소와 캐시의 연결 여부는
//! 불리언 플래그로 보고합니다.

use axum::{extract::State, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::state::AppState;

/// 헬스 체크 응답.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    /// 항상 "ok"
    pub status: String,
    /// 선호도 저장소 연결 여부
    pub database: bool,
    /// 응답 캐시 연결 여부
    pub cache: bool,
    /// API 버전
    pub version: String,
    /// 서버 업타임(초)
    pub uptime_secs: i64,
}

/// 헬스 체크.
///
/// GET /health
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "서버 응답 가능", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (database, cache) = tokio::join!(state.is_db_healthy(), state.is_cache_healthy());

    Json(HealthResponse {
        status: "ok".to_string(),
        database,
        cache,
        version: state.version.clone(),
        uptime_secs: state.uptime_secs(),
    })
}

/// 헬스 체크 라우터 생성.
pub fn health_router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(health_check))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use insight_data::{InMemoryPreferenceStore, InMemoryResponseCache};
    use tower::ServiceExt;

    async fn call(state: AppState) -> (StatusCode, HealthResponse) {
        let app = health_router().with_state(Arc::new(state));
        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_reports_connected_components() {
        use crate::state::create_test_state;

        let (status, health) = call(create_test_state()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, "ok");
        assert!(health.database);
        assert!(health.cache);
        assert!(!health.version.is_empty());
    }

    #[tokio::test]
    async fn test_health_never_fails_when_dependencies_are_down() {
        let state = AppState::new()
            .with_preferences(Arc::new(InMemoryPreferenceStore::unreachable()))
            .with_cache(Arc::new(InMemoryResponseCache::unreachable()));

        let (status, health) = call(state).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health.status, "ok");
        assert!(!health.database);
        assert!(!health.cache);
    }

    #[tokio::test]
    async fn test_health_without_store() {
        let (status, health) = call(AppState::new()).await;
        assert_eq!(status, StatusCode::OK);
        assert!(!health.database);
        assert!(health.cache);
    }
}
