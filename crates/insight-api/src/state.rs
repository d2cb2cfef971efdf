//! 모든 핸들러에서 공유되는 애플리케이션 상태.
//!
//! 프로세스 단위 핸들(DB 풀, Redis 연결, provider 클라이언트)은 시작 시 한 번 생성되어
//! `Arc<AppState>`로 핸들러에 주입됩니다.

use std::sync::Arc;

use chrono::Duration;
use insight_core::{
    AccountStore, PreferenceStore, ResponseCache, ServiceError, ServiceResult, SESSION_TTL_DAYS,
};
use insight_data::{Database, InMemoryResponseCache};
use insight_provider::{NewsSearch, ProviderChain};

use crate::services::GenerationService;

/// 인증 관련 설정.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// 고정 OTP (미설정 시 가입마다 무작위 6자리 생성)
    pub demo_otp: Option<String>,
    /// 세션 유효 기간
    pub session_ttl: Duration,
}

impl Default for AuthSettings {
    fn default() -> Self {
        Self {
            demo_otp: None,
            session_ttl: Duration::days(SESSION_TTL_DAYS),
        }
    }
}

/// 애플리케이션 공유 상태.
#[derive(Clone)]
pub struct AppState {
    /// 사용자 선호도 저장소 (미설정 시 선호도/생성 API는 NOT_CONFIGURED)
    pub preferences: Option<Arc<dyn PreferenceStore>>,

    /// 사용자/세션 저장소
    pub accounts: Option<Arc<dyn AccountStore>>,

    /// 생성 결과 캐시 (Redis 미설정 시 인메모리)
    pub cache: Arc<dyn ResponseCache>,

    /// 설정된 원격 캐시에 연결하지 못해 인메모리 캐시로 대체 중인지 여부
    pub cache_degraded: bool,

    /// primary → fallback 생성 provider 체인
    pub providers: Arc<ProviderChain>,

    /// 뉴스 검색 클라이언트 (키 미설정 시 None)
    pub news: Option<Arc<dyn NewsSearch>>,

    pub auth: AuthSettings,

    /// PostgreSQL 연결 (종료 시 풀을 닫기 위해 보관)
    pub database: Option<Database>,

    /// 서버 시작 시간 (업타임 계산용)
    pub started_at: chrono::DateTime<chrono::Utc>,

    /// API 버전
    pub version: String,
}

impl AppState {
    /// 저장소 없이 인메모리 캐시와 빈 provider 체인으로 상태를 생성합니다.
    pub fn new() -> Self {
        Self {
            preferences: None,
            accounts: None,
            cache: Arc::new(InMemoryResponseCache::new()),
            cache_degraded: false,
            providers: Arc::new(ProviderChain::new()),
            news: None,
            auth: AuthSettings::default(),
            database: None,
            started_at: chrono::Utc::now(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    pub fn with_preferences(mut self, store: Arc<dyn PreferenceStore>) -> Self {
        self.preferences = Some(store);
        self
    }

    pub fn with_accounts(mut self, store: Arc<dyn AccountStore>) -> Self {
        self.accounts = Some(store);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ResponseCache>) -> Self {
        self.cache = cache;
        self
    }

    /// 원격 캐시 연결 실패를 기록합니다. 헬스 체크에서 캐시가 비정상으로 보고됩니다.
    pub fn with_cache_degraded(mut self) -> Self {
        self.cache_degraded = true;
        self
    }

    pub fn with_providers(mut self, providers: ProviderChain) -> Self {
        self.providers = Arc::new(providers);
        self
    }

    pub fn with_news(mut self, news: Arc<dyn NewsSearch>) -> Self {
        self.news = Some(news);
        self
    }

    pub fn with_auth(mut self, auth: AuthSettings) -> Self {
        self.auth = auth;
        self
    }

    /// DB 연결을 설정합니다. 헬스 체크와 종료 처리에 사용됩니다.
    pub fn with_database(mut self, database: Database) -> Self {
        self.database = Some(database);
        self
    }

    /// 선호도 저장소. 미설정이면 `Database not initialized` 에러.
    pub fn preference_store(&self) -> ServiceResult<Arc<dyn PreferenceStore>> {
        self.preferences
            .clone()
            .ok_or_else(ServiceError::database_not_initialized)
    }

    /// 계정 저장소. 미설정이면 `Database not initialized` 에러.
    pub fn account_store(&self) -> ServiceResult<Arc<dyn AccountStore>> {
        self.accounts
            .clone()
            .ok_or_else(ServiceError::database_not_initialized)
    }

    /// 요청 단위 생성 서비스를 구성합니다.
    pub fn generation_service(&self) -> ServiceResult<GenerationService> {
        Ok(GenerationService::new(
            self.preference_store()?,
            self.cache.clone(),
            self.providers.clone(),
        ))
    }

    /// 서버 업타임(초) 반환.
    pub fn uptime_secs(&self) -> i64 {
        chrono::Utc::now()
            .signed_duration_since(self.started_at)
            .num_seconds()
    }

    /// 선호도 저장소 연결 상태 확인.
    pub async fn is_db_healthy(&self) -> bool {
        match &self.preferences {
            Some(store) => store.ping().await,
            None => false,
        }
    }

    /// 캐시 연결 상태 확인.
    pub async fn is_cache_healthy(&self) -> bool {
        !self.cache_degraded && self.cache.ping().await
    }

    /// 종료 시 외부 연결을 정리합니다.
    pub async fn shutdown(&self) {
        if let Some(database) = &self.database {
            database.close().await;
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

/// 테스트용 AppState 생성 헬퍼.
///
/// 인메모리 저장소와 캐시가 연결되며 provider는 설정되지 않습니다.
#[cfg(any(test, feature = "test-utils"))]
pub fn create_test_state() -> AppState {
    use insight_data::{InMemoryAccountStore, InMemoryPreferenceStore};

    AppState::new()
        .with_preferences(Arc::new(InMemoryPreferenceStore::new()))
        .with_accounts(Arc::new(InMemoryAccountStore::new()))
        .with_auth(AuthSettings {
            demo_otp: Some("123456".to_string()),
            ..AuthSettings::default()
        })
}
