//! 저장소 및 캐시 추상화.
//!
//! 구체 구현(PostgreSQL, Redis, 인메모리)은 `insight-data` 크레이트에 있습니다.
//! 핸들러는 이 trait 객체만 주입받으므로 테스트에서 fake로 교체할 수 있습니다.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{NewUser, PreferenceDocument, PreferenceSettings, SessionRecord, UserRecord};
use crate::error::ServiceResult;

/// 사용자 선호도 저장소.
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// 사용자 선호도 조회.
    async fn get(&self, user_id: &str) -> ServiceResult<Option<PreferenceDocument>>;

    /// 선호도 upsert.
    ///
    /// 최초 삽입 시에만 `created_at`을 설정하고, `updated_at`은 항상 `now`로 갱신합니다.
    /// 저장된 문서를 반환합니다.
    async fn upsert(
        &self,
        user_id: &str,
        settings: &PreferenceSettings,
        now: DateTime<Utc>,
    ) -> ServiceResult<PreferenceDocument>;

    /// 저장소 연결 확인.
    async fn ping(&self) -> bool;
}

/// 응답 텍스트 캐시.
///
/// 캐시는 최적화 수단이므로 호출자는 에러를 로그로만 남기고 무시합니다.
#[async_trait]
pub trait ResponseCache: Send + Sync {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>>;

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> ServiceResult<()>;

    /// 네임스페이스(`<namespace>:*`)의 모든 키 삭제. 삭제된 키 수를 반환합니다.
    async fn invalidate_namespace(&self, namespace: &str) -> ServiceResult<usize>;

    async fn ping(&self) -> bool;
}

/// 사용자/세션 저장소.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// email로 사용자 조회.
    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<UserRecord>>;

    /// username 또는 email이 일치하는 사용자 조회.
    async fn find_user_by_login(&self, login: &str) -> ServiceResult<Option<UserRecord>>;

    /// email이 없으면 생성하고, 있으면 기존 레코드를 반환합니다.
    async fn ensure_user(&self, user: NewUser) -> ServiceResult<UserRecord>;

    /// 검증 대기 중인 OTP 기록.
    async fn set_pending_otp(&self, email: &str, otp: &str) -> ServiceResult<()>;

    /// 검증 완료 처리 (대기 OTP 제거).
    async fn mark_verified(&self, email: &str) -> ServiceResult<()>;

    async fn insert_session(&self, session: &SessionRecord) -> ServiceResult<()>;

    async fn find_session(&self, access_token: &str) -> ServiceResult<Option<SessionRecord>>;
}
