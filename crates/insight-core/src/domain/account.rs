//! 사용자 계정과 세션.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// 사용자 레코드.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRecord {
    pub email: String,
    pub username: Option<String>,
    pub full_name: String,
    /// Argon2 PHC 문자열
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub verified: bool,
    pub onboarded: bool,
    #[serde(skip_serializing)]
    pub pending_otp: Option<String>,
    pub profile_picture: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRecord {
    /// 세션에 기록할 식별자 (username이 없으면 email).
    pub fn identity(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.email)
    }
}

/// 신규 사용자 생성 요청.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
}

impl NewUser {
    /// full_name이 비어 있으면 email의 로컬 파트를 사용합니다.
    pub fn new(email: impl Into<String>, full_name: Option<&str>, password_hash: String) -> Self {
        let email = email.into();
        let full_name = match full_name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => email.split('@').next().unwrap_or_default().to_string(),
        };
        Self {
            email,
            full_name,
            password_hash,
        }
    }
}

/// 인증 세션.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub access_token: String,
    /// 사용자 식별자 (username 또는 email)
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionRecord {
    /// `ttl` 동안 유효한 세션을 생성합니다.
    pub fn issue(access_token: String, username: impl Into<String>, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            access_token,
            username: username.into(),
            created_at: now,
            expires_at: now + ttl,
        }
    }

    /// 주어진 시각 기준 만료 여부.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
