//! 통합 API 에러 응답 타입.
//!
//! 모든 API 엔드포인트에서 일관된 에러 형식을 제공합니다.

use axum::http::{Method, StatusCode, Uri};
use axum::Json;
use insight_core::ServiceError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

/// 통합 API 에러 응답.
///
/// ```json
/// {
///   "code": "NOT_FOUND",
///   "message": "Preferences not found for user",
///   "timestamp": 1738300800
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ApiErrorResponse {
    /// 에러 코드 (예: "NOT_FOUND", "NOT_CONFIGURED", "UPSTREAM_ERROR")
    pub code: String,
    /// 사람이 읽을 수 있는 에러 메시지
    pub message: String,
    /// 추가 에러 상세 정보
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
    /// 에러 발생 타임스탬프 (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    /// HTTP 메서드
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    /// 요청 경로
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ApiErrorResponse {
    /// 기본 에러 생성 (타임스탬프 포함).
    ///
    /// ```
    /// use insight_api::error::ApiErrorResponse;
    ///
    /// let error = ApiErrorResponse::new("NOT_FOUND", "User not found");
    /// assert_eq!(error.code(), "NOT_FOUND");
    /// ```
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
            timestamp: Some(chrono::Utc::now().timestamp()),
            method: None,
            path: None,
        }
    }

    /// 상세 정보 포함 에러 생성.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: Value,
    ) -> Self {
        Self {
            details: Some(details),
            ..Self::new(code, message)
        }
    }

    /// 타임스탬프 없는 간단한 에러.
    pub fn simple(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: None,
            ..Self::new(code, message)
        }
    }

    /// 요청 정보(메서드, 경로)를 추가합니다.
    #[must_use]
    pub fn with_request_info(mut self, method: &Method, uri: &Uri) -> Self {
        self.method = Some(method.to_string());
        self.path = Some(uri.path().to_string());
        self
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ApiErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiErrorResponse {}

/// API 핸들러 Result 타입 별칭.
pub type ApiResult<T> = Result<T, (StatusCode, Json<ApiErrorResponse>)>;

/// 서비스 에러의 HTTP 상태 코드.
pub fn status_for(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidCredentials
        | ServiceError::InvalidOtp
        | ServiceError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::Upstream(_) => StatusCode::BAD_GATEWAY,
        ServiceError::Database(_) | ServiceError::Internal(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// 서비스 에러를 핸들러 에러 튜플로 변환합니다.
///
/// `?`와 함께 `.map_err(into_api_error)` 형태로 사용합니다.
pub fn into_api_error(err: ServiceError) -> (StatusCode, Json<ApiErrorResponse>) {
    let status = status_for(&err);
    if status.is_server_error() {
        error!(code = err.code(), error = %err, "Request failed");
    }
    (status, Json(ApiErrorResponse::new(err.code(), err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_has_no_timestamp() {
        let error = ApiErrorResponse::simple("NOT_FOUND", "missing");
        let json = serde_json::to_value(&error).unwrap();
        assert!(json.get("timestamp").is_none());
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_with_request_info() {
        let uri: Uri = "/api/preferences?user_id=a".parse().unwrap();
        let error = ApiErrorResponse::new("NOT_FOUND", "missing").with_request_info(&Method::GET, &uri);
        assert_eq!(error.method.as_deref(), Some("GET"));
        assert_eq!(error.path.as_deref(), Some("/api/preferences"));
        assert_eq!(error.to_string(), "[NOT_FOUND] missing");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            status_for(&ServiceError::database_not_initialized()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_for(&ServiceError::preferences_not_found()), StatusCode::NOT_FOUND);
        assert_eq!(status_for(&ServiceError::InvalidOtp), StatusCode::BAD_REQUEST);
        assert_eq!(
            status_for(&ServiceError::Unauthorized("Invalid token".into())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_for(&ServiceError::Upstream("boom".into())),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_into_api_error_body() {
        let (status, Json(body)) = into_api_error(ServiceError::InvalidCredentials);
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.code, "INVALID_CREDENTIALS");
        assert_eq!(body.message, "Invalid credentials");
        assert!(body.timestamp.is_some());
    }
}
