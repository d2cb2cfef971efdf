use async_trait::async_trait;
use chrono::Utc;
use insight_core::{AccountStore, NewUser, ServiceResult, SessionRecord, UserRecord};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// 인메모리 계정 저장소.
#[derive(Debug, Default)]
pub struct InMemoryAccountStore {
    users: RwLock<HashMap<String, UserRecord>>,
    sessions: RwLock<HashMap<String, SessionRecord>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 레코드를 직접 삽입하거나 교체합니다.
    pub async fn put_user(&self, user: UserRecord) {
        self.users.write().await.insert(user.email.clone(), user);
    }
}

#[async_trait]
impl AccountStore for InMemoryAccountStore {
    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<UserRecord>> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn find_user_by_login(&self, login: &str) -> ServiceResult<Option<UserRecord>> {
        let users = self.users.read().await;
        Ok(users
            .values()
            .find(|u| u.username.as_deref() == Some(login) || u.email == login)
            .cloned())
    }

    async fn ensure_user(&self, user: NewUser) -> ServiceResult<UserRecord> {
        let mut users = self.users.write().await;
        if let Some(existing) = users.get(&user.email) {
            return Ok(existing.clone());
        }

        let now = Utc::now();
        let record = UserRecord {
            email: user.email.clone(),
            username: None,
            full_name: user.full_name,
            password_hash: user.password_hash,
            verified: false,
            onboarded: false,
            pending_otp: None,
            profile_picture: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(user.email, record.clone());
        Ok(record)
    }

    async fn set_pending_otp(&self, email: &str, otp: &str) -> ServiceResult<()> {
        if let Some(user) = self.users.write().await.get_mut(email) {
            user.pending_otp = Some(otp.to_string());
            user.verified = false;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn mark_verified(&self, email: &str) -> ServiceResult<()> {
        if let Some(user) = self.users.write().await.get_mut(email) {
            user.pending_otp = None;
            user.verified = true;
            user.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn insert_session(&self, session: &SessionRecord) -> ServiceResult<()> {
        self.sessions
            .write()
            .await
            .insert(session.access_token.clone(), session.clone());
        Ok(())
    }

    async fn find_session(&self, access_token: &str) -> ServiceResult<Option<SessionRecord>> {
        Ok(self.sessions.read().await.get(access_token).cloned())
    }
}
