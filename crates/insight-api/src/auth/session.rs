//! Bearer 세션 토큰과 OTP.

use std::sync::Arc;

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, StatusCode},
    Json,
};
use chrono::Utc;
use insight_core::{ServiceError, UserRecord};
use rand::{Rng, RngCore};

use crate::error::{into_api_error, ApiErrorResponse};
use crate::state::AppState;

/// 세션 토큰 바이트 수 (hex 인코딩 시 64자).
const TOKEN_BYTES: usize = 32;

/// 무작위 세션 토큰을 생성합니다.
pub fn generate_access_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// 6자리 OTP. `demo_otp`가 설정되어 있으면 그 값을 사용합니다.
pub fn issue_otp(demo_otp: Option<&str>) -> String {
    match demo_otp.map(str::trim) {
        Some(otp) if !otp.is_empty() => otp.to_string(),
        _ => format!("{:06}", rand::thread_rng().gen_range(0..1_000_000)),
    }
}

/// `Authorization` 헤더 값에서 bearer 토큰을 꺼냅니다.
///
/// 스킴은 대소문자를 구분하지 않으며 `<scheme> <token>` 두 부분이어야 합니다.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("bearer") => Some(token),
        _ => None,
    }
}

/// 유효한 세션으로 인증된 사용자 추출기.
///
/// ```rust,ignore
/// async fn handler(CurrentUser(user): CurrentUser) -> String {
///     user.email
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl FromRequestParts<Arc<AppState>> for CurrentUser {
    type Rejection = (StatusCode, Json<ApiErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let accounts = state.account_store().map_err(into_api_error)?;

        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .and_then(parse_bearer)
            .ok_or_else(|| unauthorized("Unauthorized"))?;

        let session = accounts
            .find_session(token)
            .await
            .map_err(into_api_error)?
            .filter(|session| !session.is_expired_at(Utc::now()))
            .ok_or_else(|| unauthorized("Invalid token"))?;

        let user = accounts
            .find_user_by_login(&session.username)
            .await
            .map_err(into_api_error)?
            .ok_or_else(|| unauthorized("Invalid user"))?;

        Ok(CurrentUser(user))
    }
}

fn unauthorized(message: &str) -> (StatusCode, Json<ApiErrorResponse>) {
    into_api_error(ServiceError::Unauthorized(message.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bearer() {
        assert_eq!(parse_bearer("Bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("bearer abc"), Some("abc"));
        assert_eq!(parse_bearer("Basic abc"), None);
        assert_eq!(parse_bearer("Bearer"), None);
        assert_eq!(parse_bearer("Bearer a b"), None);
        assert_eq!(parse_bearer(""), None);
    }

    #[test]
    fn test_access_token_shape() {
        let a = generate_access_token();
        let b = generate_access_token();
        assert_eq!(a.len(), TOKEN_BYTES * 2);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_issue_otp() {
        assert_eq!(issue_otp(Some("123456")), "123456");

        let otp = issue_otp(None);
        assert_eq!(otp.len(), 6);
        assert!(otp.chars().all(|c| c.is_ascii_digit()));

        assert_eq!(issue_otp(Some("  ")).len(), 6);
    }
}
