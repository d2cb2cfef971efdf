//! 설정에서 프로세스 단위 핸들을 만들고 라우터를 조립합니다.
//!
//! 외부 의존성 연결 실패는 서버 시작을 막지 않습니다. 해당 기능만 비활성화되고
//! 헬스 체크에 상태가 드러납니다.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    http::{header, Method, StatusCode},
    middleware,
    routing::get,
    Router,
};
use insight_core::AppConfig;
use insight_data::{
    Database, DatabaseConfig, PgAccountStore, PgPreferenceStore, RedisCache, RedisConfig,
};
use insight_provider::{
    GeminiConfig, GeminiProvider, NewsSearch, OpenAiConfig, OpenAiProvider, ProviderChain,
    TavilyClient, TavilyConfig,
};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::middleware::metrics_layer;
use crate::openapi::swagger_ui_router;
use crate::routes::create_api_router;
use crate::state::{AppState, AuthSettings};

/// 요청 처리 제한 시간.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// 설정된 키로 primary(Gemini) → fallback(OpenAI) 체인을 구성합니다.
pub fn build_providers(config: &AppConfig) -> ProviderChain {
    let mut chain = ProviderChain::new();

    if let Some(key) = config.gemini_key() {
        let gemini = GeminiConfig::new(key, config.gemini_model.clone())
            .with_base_url(config.gemini_base_url.clone())
            .with_timeout_secs(config.provider_timeout_secs);
        match GeminiProvider::new(gemini) {
            Ok(provider) => chain = chain.with_primary(Arc::new(provider)),
            Err(e) => warn!(error = %e, "Gemini provider disabled"),
        }
    }

    if let Some(key) = config.openai_key() {
        let openai = OpenAiConfig::new(key, config.openai_model.clone())
            .with_base_url(config.openai_base_url.clone())
            .with_timeout_secs(config.provider_timeout_secs);
        match OpenAiProvider::new(openai) {
            Ok(provider) => chain = chain.with_fallback(Arc::new(provider)),
            Err(e) => warn!(error = %e, "OpenAI provider disabled"),
        }
    }

    if chain.is_configured() {
        info!(providers = ?chain.provider_names(), "Generation providers configured");
    } else {
        warn!("No generation provider configured");
    }
    chain
}

/// Tavily 키가 있으면 뉴스 검색 클라이언트를 만듭니다.
pub fn build_news(config: &AppConfig) -> Option<Arc<dyn NewsSearch>> {
    let key = config.tavily_key()?;
    let tavily = TavilyConfig::new(key)
        .with_base_url(config.tavily_base_url.clone())
        .with_timeout_secs(config.news_timeout_secs);

    match TavilyClient::new(tavily) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            warn!(error = %e, "News search disabled");
            None
        }
    }
}

async fn connect_database(url: &str, max_connections: u32) -> Option<Database> {
    let config = DatabaseConfig::new(url).with_max_connections(max_connections);
    let db = match Database::connect(&config).await {
        Ok(db) => db,
        Err(e) => {
            warn!(error = %e, "Failed to connect to database");
            return None;
        }
    };

    if let Err(e) = db.migrate().await {
        warn!(error = %e, "Database migration failed");
        return None;
    }
    info!("Database connected");
    Some(db)
}

/// 설정으로 애플리케이션 상태를 생성합니다.
pub async fn create_app_state(config: &AppConfig) -> AppState {
    let mut state = AppState::new()
        .with_providers(build_providers(config))
        .with_auth(AuthSettings {
            demo_otp: config.auth_demo_otp.clone().filter(|otp| !otp.is_empty()),
            ..AuthSettings::default()
        });

    match config.database_url.as_deref() {
        Some(url) => {
            if let Some(db) = connect_database(url, config.database_max_connections).await {
                state = state
                    .with_preferences(Arc::new(PgPreferenceStore::new(db.clone())))
                    .with_accounts(Arc::new(PgAccountStore::new(db.clone())))
                    .with_database(db);
            }
        }
        None => warn!("DATABASE_URL not set, preference and auth endpoints disabled"),
    }

    match config.redis_url.as_deref() {
        Some(url) => match RedisCache::connect(&RedisConfig::new(url)).await {
            Ok(cache) => {
                info!("Redis connected");
                state = state.with_cache(Arc::new(cache));
            }
            Err(e) => {
                warn!(error = %e, "Failed to connect to Redis, using in-memory cache");
                state = state.with_cache_degraded();
            }
        },
        None => info!("REDIS_URL not set, using in-memory cache"),
    }

    if let Some(news) = build_news(config) {
        state = state.with_news(news);
    }

    state
}

/// CORS 레이어 생성.
///
/// origin 목록이 비어 있으면 모든 origin을 허용합니다.
pub fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<_> = origins.iter().filter_map(|o| o.parse().ok()).collect();

    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if parsed.is_empty() {
        warn!("CORS_ORIGINS not set, allowing any origin");
        layer.allow_origin(Any)
    } else {
        info!(origins = ?origins, "CORS origins configured");
        layer
            .allow_origin(AllowOrigin::list(parsed))
            .allow_credentials(true)
    }
}

async fn metrics_handler(State(handle): State<PrometheusHandle>) -> String {
    handle.render()
}

/// 전체 애플리케이션 라우터 생성.
pub fn create_router(
    state: Arc<AppState>,
    metrics_handle: PrometheusHandle,
    cors: CorsLayer,
) -> Router {
    let metrics_router = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(metrics_handle);

    Router::new()
        .merge(metrics_router)
        .merge(create_api_router().with_state(state))
        .merge(swagger_ui_router())
        .layer(middleware::from_fn(metrics_layer))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            REQUEST_TIMEOUT,
        ))
        .layer(cors)
}
