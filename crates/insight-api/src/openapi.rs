//! OpenAPI 문서화 설정.
//!
//! utoipa로 REST API의 OpenAPI 3 스펙을 생성합니다.
//! Swagger UI는 `/swagger-ui` 경로에서 사용 가능합니다.
//!
//! 새로운 엔드포인트를 추가할 때:
//!
//! 1. 응답/요청 타입에 `#[derive(ToSchema)]` 추가
//! 2. 핸들러에 `#[utoipa::path(...)]` 어노테이션 추가
//! 3. 이 파일의 `components(schemas(...))` 및 `paths(...)` 섹션에 추가

use axum::Router;
use insight_core::{
    ChartPoint, ChartType, Currency, FinanceMetric, Granularity, PreferenceDocument,
    PreferenceSettings, PreferencesInput, Theme, TimeRange,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::error::ApiErrorResponse;
use crate::routes::{
    auth::{
        LoginForm, SignupRequest, SignupResponse, TokenResponse, UserInfo, UserInfoResponse,
        VerifyOtpRequest,
    },
    news::NewsResponse,
    preferences::{CustomizeConfirmation, PreferencesResponse},
    HealthResponse,
};
use crate::services::{ComposeRequest, ComposeResponse, GenerationResult};

/// Insight API 문서.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Insight API",
        description = r#"
선호도 기반 금융 인사이트 생성 API.

- **선호도**: 차트/지표/기간/통화 등 사용자별 표시 설정 저장
- **생성**: 선호도로 만든 프롬프트를 AI provider(Gemini → OpenAI)에 전달하고 결과를 600초 캐시
- **뉴스**: 저장된 지표 기반 관련 뉴스 검색
- **인증**: 가입/OTP/로그인, `Authorization: Bearer <token>` 세션
"#,
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:8000", description = "로컬 개발 서버"),
    ),
    tags(
        (name = "health", description = "헬스 체크"),
        (name = "preferences", description = "선호도 저장/조회"),
        (name = "generation", description = "인사이트 생성"),
        (name = "news", description = "관련 뉴스"),
        (name = "auth", description = "가입/로그인/세션")
    ),
    modifiers(&BearerSecurity),
    components(
        schemas(
            ApiErrorResponse,
            HealthResponse,

            // ===== Preferences =====
            ChartType,
            FinanceMetric,
            TimeRange,
            Currency,
            Granularity,
            Theme,
            PreferenceSettings,
            PreferenceDocument,
            PreferencesInput,
            CustomizeConfirmation,
            PreferencesResponse,

            // ===== Generation =====
            GenerationResult,
            ComposeRequest,
            ComposeResponse,
            ChartPoint,

            NewsResponse,

            // ===== Auth =====
            SignupRequest,
            SignupResponse,
            VerifyOtpRequest,
            LoginForm,
            TokenResponse,
            UserInfo,
            UserInfoResponse,
        )
    ),
    paths(
        crate::routes::health::health_check,
        crate::routes::preferences::save_preferences,
        crate::routes::preferences::get_preferences,
        crate::routes::generate::generate,
        crate::routes::generate::compose,
        crate::routes::news::related_news,
        crate::routes::auth::registration,
        crate::routes::auth::verify_otp,
        crate::routes::auth::login,
        crate::routes::auth::is_new_user,
        crate::routes::auth::get_user_info,
    )
)]
pub struct ApiDoc;

/// `bearer` 보안 스킴 등록.
struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

/// Swagger UI 라우터 생성.
///
/// - `/swagger-ui` - Swagger UI 대화형 문서
/// - `/api-docs/openapi.json` - OpenAPI JSON 스펙
pub fn swagger_ui_router<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_document_valid() {
        let json = serde_json::to_string_pretty(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("Insight API"));
        assert!(json.contains("/health"));
        assert!(json.contains("/api/customize"));
        assert!(json.contains("/api/generate"));
        assert!(json.contains("/api/news"));
        assert!(json.contains("/verify-otp"));
    }

    #[test]
    fn test_openapi_contains_schemas() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();

        assert!(json.contains("PreferenceDocument"));
        assert!(json.contains("GenerationResult"));
        assert!(json.contains("ApiErrorResponse"));
        assert!(json.contains("\"bearer\""));
    }

    #[test]
    fn test_swagger_ui_router_creates() {
        let _router: Router<()> = swagger_ui_router();
    }
}
