//! REST API 서버.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - Axum 기반 REST API (선호도, 생성, 뉴스, 인증)
//! - 선호도 기반 생성 오케스트레이터
//! - 헬스 체크 엔드포인트
//! - Prometheus 메트릭
//!
//! # 모듈 구성
//!
//! - [`bootstrap`]: 설정에서 프로세스 단위 핸들 생성
//! - [`state`]: 애플리케이션 공유 상태 (AppState)
//! - [`services`]: 생성 오케스트레이터
//! - [`routes`]: REST API 엔드포인트
//! - [`auth`]: 비밀번호 해싱과 bearer 세션
//! - [`metrics`]: Prometheus 메트릭 수집
//! - [`middleware`]: HTTP 미들웨어
//! - [`openapi`]: OpenAPI 문서 및 Swagger UI

pub mod auth;
pub mod bootstrap;
pub mod error;
pub mod metrics;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod services;
pub mod state;

pub use error::{ApiErrorResponse, ApiResult};
pub use metrics::setup_metrics_recorder;
pub use middleware::metrics_layer;
pub use routes::create_api_router;
pub use services::GenerationService;
pub use state::AppState;

#[cfg(any(test, feature = "test-utils"))]
pub use state::create_test_state;
