//! 사용자/세션 repository (PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use insight_core::{AccountStore, NewUser, ServiceResult, SessionRecord, UserRecord};
use sqlx::FromRow;
use tracing::{debug, instrument};

use super::postgres::Database;
use crate::error::Result;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    email: String,
    username: Option<String>,
    full_name: String,
    password_hash: String,
    verified: bool,
    onboarded: bool,
    pending_otp: Option<String>,
    profile_picture: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for UserRecord {
    fn from(row: UserRow) -> Self {
        UserRecord {
            email: row.email,
            username: row.username,
            full_name: row.full_name,
            password_hash: row.password_hash,
            verified: row.verified,
            onboarded: row.onboarded,
            pending_otp: row.pending_otp,
            profile_picture: row.profile_picture,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, FromRow)]
struct SessionRow {
    access_token: String,
    username: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord {
            access_token: row.access_token,
            username: row.username,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

/// PostgreSQL 기반 계정 저장소.
#[derive(Clone)]
pub struct PgAccountStore {
    db: Database,
}

impl PgAccountStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn user_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(self.db.pool())
            .await?;
        Ok(row.map(Into::into))
    }

    async fn user_by_login(&self, login: &str) -> Result<Option<UserRecord>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT * FROM users WHERE username = $1 OR email = $1 LIMIT 1")
                .bind(login)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(row.map(Into::into))
    }

    async fn insert_or_get_user(&self, user: NewUser) -> Result<UserRecord> {
        // 이미 존재하면 갱신 없이 기존 행을 그대로 반환
        let row: UserRow = sqlx::query_as(
            r#"
            INSERT INTO users (email, full_name, password_hash)
            VALUES ($1, $2, $3)
            ON CONFLICT (email) DO UPDATE SET email = users.email
            RETURNING *
            "#,
        )
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.password_hash)
        .fetch_one(self.db.pool())
        .await?;
        Ok(row.into())
    }

    async fn update_otp(&self, email: &str, otp: Option<&str>, verified: bool) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE users
            SET pending_otp = $2, verified = $3, updated_at = NOW()
            WHERE email = $1
            "#,
        )
        .bind(email)
        .bind(otp)
        .bind(verified)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn save_session(&self, session: &SessionRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (access_token, username, created_at, expires_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&session.access_token)
        .bind(&session.username)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(self.db.pool())
        .await?;
        Ok(())
    }

    async fn session_by_token(&self, access_token: &str) -> Result<Option<SessionRecord>> {
        let row: Option<SessionRow> =
            sqlx::query_as("SELECT * FROM sessions WHERE access_token = $1")
                .bind(access_token)
                .fetch_optional(self.db.pool())
                .await?;
        Ok(row.map(Into::into))
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn find_user_by_email(&self, email: &str) -> ServiceResult<Option<UserRecord>> {
        Ok(self.user_by_email(email).await?)
    }

    async fn find_user_by_login(&self, login: &str) -> ServiceResult<Option<UserRecord>> {
        Ok(self.user_by_login(login).await?)
    }

    #[instrument(skip(self, user), fields(email = %user.email))]
    async fn ensure_user(&self, user: NewUser) -> ServiceResult<UserRecord> {
        Ok(self.insert_or_get_user(user).await?)
    }

    async fn set_pending_otp(&self, email: &str, otp: &str) -> ServiceResult<()> {
        Ok(self.update_otp(email, Some(otp), false).await?)
    }

    async fn mark_verified(&self, email: &str) -> ServiceResult<()> {
        debug!(email, "Marking user verified");
        Ok(self.update_otp(email, None, true).await?)
    }

    async fn insert_session(&self, session: &SessionRecord) -> ServiceResult<()> {
        Ok(self.save_session(session).await?)
    }

    async fn find_session(&self, access_token: &str) -> ServiceResult<Option<SessionRecord>> {
        Ok(self.session_by_token(access_token).await?)
    }
}
