use async_trait::async_trait;
use chrono::{DateTime, Utc};
use insight_core::{
    PreferenceDocument, PreferenceSettings, PreferenceStore, ServiceError, ServiceResult,
};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// 인메모리 선호도 저장소.
#[derive(Debug, Default)]
pub struct InMemoryPreferenceStore {
    documents: RwLock<HashMap<String, PreferenceDocument>>,
    unreachable: bool,
}

impl InMemoryPreferenceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 호출이 실패하는 저장소.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }

    fn check(&self) -> ServiceResult<()> {
        if self.unreachable {
            return Err(ServiceError::Database("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl PreferenceStore for InMemoryPreferenceStore {
    async fn get(&self, user_id: &str) -> ServiceResult<Option<PreferenceDocument>> {
        self.check()?;
        Ok(self.documents.read().await.get(user_id).cloned())
    }

    async fn upsert(
        &self,
        user_id: &str,
        settings: &PreferenceSettings,
        now: DateTime<Utc>,
    ) -> ServiceResult<PreferenceDocument> {
        self.check()?;
        let mut documents = self.documents.write().await;

        let created_at = documents
            .get(user_id)
            .map(|existing| existing.created_at)
            .unwrap_or(now);

        let doc = PreferenceDocument {
            user_id: user_id.to_string(),
            settings: *settings,
            created_at,
            updated_at: now,
        };
        documents.insert(user_id.to_string(), doc.clone());
        Ok(doc)
    }

    async fn ping(&self) -> bool {
        !self.unreachable
    }
}
