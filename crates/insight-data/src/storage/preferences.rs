//! 선호도 repository (PostgreSQL).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use insight_core::{PreferenceDocument, PreferenceSettings, PreferenceStore, ServiceResult};
use sqlx::FromRow;
use tracing::{debug, instrument};

use super::postgres::Database;
use crate::error::{DataError, Result};

/// `user_preferences` 테이블 레코드.
#[derive(Debug, Clone, FromRow)]
pub struct PreferenceRecord {
    pub user_id: String,
    pub chart_type: String,
    pub finance_metric: String,
    pub time_range: String,
    pub currency: String,
    pub granularity: String,
    pub theme: String,
    pub show_news: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PreferenceRecord> for PreferenceDocument {
    type Error = DataError;

    fn try_from(record: PreferenceRecord) -> Result<Self> {
        let invalid = |e: insight_core::InvalidPreferenceValue| DataError::InvalidData(e.to_string());

        Ok(PreferenceDocument {
            user_id: record.user_id,
            settings: PreferenceSettings {
                chart_type: record.chart_type.parse().map_err(invalid)?,
                finance_metric: record.finance_metric.parse().map_err(invalid)?,
                time_range: record.time_range.parse().map_err(invalid)?,
                currency: record.currency.parse().map_err(invalid)?,
                granularity: record.granularity.parse().map_err(invalid)?,
                theme: record.theme.parse().map_err(invalid)?,
                show_news: record.show_news,
            },
            created_at: record.created_at,
            updated_at: record.updated_at,
        })
    }
}

/// PostgreSQL 기반 선호도 저장소.
///
/// 동시 저장은 `ON CONFLICT DO UPDATE`로 처리되며 마지막 쓰기가 유지됩니다.
#[derive(Clone)]
pub struct PgPreferenceStore {
    db: Database,
}

impl PgPreferenceStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    async fn fetch(&self, user_id: &str) -> Result<Option<PreferenceDocument>> {
        let record: Option<PreferenceRecord> =
            sqlx::query_as("SELECT * FROM user_preferences WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(self.db.pool())
                .await?;

        record.map(PreferenceDocument::try_from).transpose()
    }

    async fn save(
        &self,
        user_id: &str,
        settings: &PreferenceSettings,
        now: DateTime<Utc>,
    ) -> Result<PreferenceDocument> {
        let record: PreferenceRecord = sqlx::query_as(
            r#"
            INSERT INTO user_preferences (
                user_id, chart_type, finance_metric, time_range, currency,
                granularity, theme, show_news, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
            ON CONFLICT (user_id) DO UPDATE SET
                chart_type = EXCLUDED.chart_type,
                finance_metric = EXCLUDED.finance_metric,
                time_range = EXCLUDED.time_range,
                currency = EXCLUDED.currency,
                granularity = EXCLUDED.granularity,
                theme = EXCLUDED.theme,
                show_news = EXCLUDED.show_news,
                updated_at = EXCLUDED.updated_at
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(settings.chart_type.as_str())
        .bind(settings.finance_metric.as_str())
        .bind(settings.time_range.as_str())
        .bind(settings.currency.as_str())
        .bind(settings.granularity.as_str())
        .bind(settings.theme.as_str())
        .bind(settings.show_news)
        .bind(now)
        .fetch_one(self.db.pool())
        .await?;

        debug!(user_id, "Preferences upserted");
        record.try_into()
    }
}

#[async_trait]
impl PreferenceStore for PgPreferenceStore {
    #[instrument(skip(self))]
    async fn get(&self, user_id: &str) -> ServiceResult<Option<PreferenceDocument>> {
        Ok(self.fetch(user_id).await?)
    }

    #[instrument(skip(self, settings))]
    async fn upsert(
        &self,
        user_id: &str,
        settings: &PreferenceSettings,
        now: DateTime<Utc>,
    ) -> ServiceResult<PreferenceDocument> {
        Ok(self.save(user_id, settings, now).await?)
    }

    async fn ping(&self) -> bool {
        self.db.health_check().await.unwrap_or(false)
    }
}
