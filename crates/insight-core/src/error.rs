//! 서비스 에러 타입.
//!
//! 이 모듈은 인사이트 서비스 전반에서 사용되는 에러 타입을 정의합니다.
//! HTTP 상태 코드로의 매핑은 API 레이어에서 담당합니다.

use thiserror::Error;

/// 핵심 서비스 에러.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// 필수 외부 자격증명/서비스 미설정 (AI 키, 검색 키, 저장소 미초기화)
    #[error("{0}")]
    NotConfigured(String),

    /// 요청한 리소스 없음
    #[error("{0}")]
    NotFound(String),

    /// 로그인/가입 자격증명 불일치 (어떤 필드가 틀렸는지 노출하지 않음)
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// OTP 불일치
    #[error("Invalid OTP")]
    InvalidOtp,

    /// 인증 토큰 누락 또는 무효
    #[error("{0}")]
    Unauthorized(String),

    /// 잘못된 입력
    #[error("{0}")]
    InvalidInput(String),

    /// 외부 업스트림 실패 (검색 API, AI provider)
    #[error("{0}")]
    Upstream(String),

    /// 데이터베이스 에러
    #[error("데이터베이스 에러: {0}")]
    Database(String),

    /// 내부 에러
    #[error("내부 에러: {0}")]
    Internal(String),
}

/// 서비스 작업을 위한 Result 타입.
pub type ServiceResult<T> = Result<T, ServiceError>;

impl ServiceError {
    /// 저장소 미초기화 에러.
    pub fn database_not_initialized() -> Self {
        ServiceError::NotConfigured("Database not initialized".to_string())
    }

    /// 선호도 문서 없음 에러.
    pub fn preferences_not_found() -> Self {
        ServiceError::NotFound("Preferences not found for user".to_string())
    }

    /// 응답 코드 문자열 (API 에러 바디의 `code` 필드).
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::NotConfigured(_) => "NOT_CONFIGURED",
            ServiceError::NotFound(_) => "NOT_FOUND",
            ServiceError::InvalidCredentials => "INVALID_CREDENTIALS",
            ServiceError::InvalidOtp => "INVALID_OTP",
            ServiceError::Unauthorized(_) => "UNAUTHORIZED",
            ServiceError::InvalidInput(_) => "INVALID_INPUT",
            ServiceError::Upstream(_) => "UPSTREAM_ERROR",
            ServiceError::Database(_) => "DB_ERROR",
            ServiceError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// 클라이언트 책임 에러인지 확인합니다.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            ServiceError::NotFound(_)
                | ServiceError::InvalidCredentials
                | ServiceError::InvalidOtp
                | ServiceError::Unauthorized(_)
                | ServiceError::InvalidInput(_)
        )
    }
}

impl From<serde_json::Error> for ServiceError {
    fn from(err: serde_json::Error) -> Self {
        ServiceError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(ServiceError::database_not_initialized().code(), "NOT_CONFIGURED");
        assert_eq!(ServiceError::preferences_not_found().code(), "NOT_FOUND");
        assert_eq!(ServiceError::InvalidCredentials.code(), "INVALID_CREDENTIALS");
    }

    #[test]
    fn test_invalid_credentials_message_is_generic() {
        assert_eq!(ServiceError::InvalidCredentials.to_string(), "Invalid credentials");
    }

    #[test]
    fn test_client_error_classification() {
        assert!(ServiceError::preferences_not_found().is_client_error());
        assert!(ServiceError::InvalidOtp.is_client_error());
        assert!(!ServiceError::database_not_initialized().is_client_error());
        assert!(!ServiceError::Upstream("boom".to_string()).is_client_error());
    }
}
