use async_trait::async_trait;
use insight_core::{ResponseCache, ServiceError, ServiceResult};
use std::collections::HashMap;
use tokio::sync::RwLock;
use tokio::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expires_at: Instant,
}

/// TTL을 지원하는 인메모리 응답 캐시.
///
/// 만료된 항목은 조회 시점과 쓰기 시점에 제거됩니다.
#[derive(Debug, Default)]
pub struct InMemoryResponseCache {
    entries: RwLock<HashMap<String, Entry>>,
    unreachable: bool,
}

impl InMemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 모든 호출이 실패하는 캐시.
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// 만료되지 않은 키 목록.
    pub async fn keys(&self) -> Vec<String> {
        let now = Instant::now();
        self.entries
            .read()
            .await
            .iter()
            .filter(|(_, entry)| entry.expires_at > now)
            .map(|(key, _)| key.clone())
            .collect()
    }

    fn check(&self) -> ServiceResult<()> {
        if self.unreachable {
            return Err(ServiceError::Internal("cache: connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ResponseCache for InMemoryResponseCache {
    async fn get(&self, key: &str) -> ServiceResult<Option<String>> {
        self.check()?;
        let now = Instant::now();

        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // 만료
        self.entries.write().await.remove(key);
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl_secs: u64) -> ServiceResult<()> {
        self.check()?;
        let now = Instant::now();
        let entry = Entry {
            value: value.to_string(),
            expires_at: now + Duration::from_secs(ttl_secs),
        };

        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(key.to_string(), entry);
        Ok(())
    }

    async fn invalidate_namespace(&self, namespace: &str) -> ServiceResult<usize> {
        self.check()?;
        let prefix = format!("{}:", namespace);
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !key.starts_with(&prefix));
        Ok(before - entries.len())
    }

    async fn ping(&self) -> bool {
        !self.unreachable
    }
}
