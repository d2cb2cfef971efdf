//! 선호도 기반 생성 파이프라인.
//!
//! 선호도 로드 → 프롬프트 생성 → 캐시 확인 → (miss 시) provider 체인 호출 → 캐시 저장 순으로
//! 처리합니다. 캐시 에러는 로그만 남기고 무시합니다.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use insight_core::{
    build_compose_system_prompt, build_prompt, extract_chart_json, fingerprint,
    generation_cache_key, resolve_user_id, user_span, ChartPoint, PreferenceDocument,
    PreferenceStore, PreferencesInput, ResponseCache, ServiceError, ServiceResult,
    COMPOSE_NAMESPACE, GENERATE_NAMESPACE, GENERATION_CACHE_TTL_SECS,
};
use insight_provider::{GenerationOutcome, GenerationRequest, ProviderChain};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn, Instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::metrics::{record_cache_lookup, record_generation};

/// compose 호출의 temperature.
pub const COMPOSE_TEMPERATURE: f32 = 0.7;

/// 생성 결과.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct GenerationResult {
    pub user_id: String,
    pub preferences: PreferenceDocument,
    /// 생성된 텍스트 또는 실패 대체 문구
    pub response: String,
    /// 캐시에서 반환되었는지 여부
    pub cached: bool,
}

/// 자유 프롬프트 생성 요청.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct ComposeRequest {
    #[validate(length(min = 1, message = "prompt must not be empty"))]
    pub prompt: String,
    /// formal | informal
    #[serde(default = "default_tone")]
    pub tone: String,
    #[serde(default)]
    pub include_charts: bool,
    /// short | long
    #[serde(default = "default_length")]
    pub length: String,
}

fn default_tone() -> String {
    "formal".to_string()
}

fn default_length() -> String {
    "short".to_string()
}

impl ComposeRequest {
    /// 캐시 키 계산을 위해 tone/length를 소문자로 정규화합니다.
    fn normalized(&self) -> Self {
        Self {
            prompt: self.prompt.clone(),
            tone: self.tone.trim().to_lowercase(),
            include_charts: self.include_charts,
            length: self.length.trim().to_lowercase(),
        }
    }
}

/// 자유 프롬프트 생성 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ComposeResponse {
    pub text: String,
    pub chart_data: Option<Vec<ChartPoint>>,
}

/// 생성 오케스트레이터.
#[derive(Clone)]
pub struct GenerationService {
    preferences: Arc<dyn PreferenceStore>,
    cache: Arc<dyn ResponseCache>,
    providers: Arc<ProviderChain>,
}

impl GenerationService {
    pub fn new(
        preferences: Arc<dyn PreferenceStore>,
        cache: Arc<dyn ResponseCache>,
        providers: Arc<ProviderChain>,
    ) -> Self {
        Self {
            preferences,
            cache,
            providers,
        }
    }

    /// 선호도를 저장하고 생성 캐시 네임스페이스를 비웁니다.
    pub async fn save_preferences(
        &self,
        input: PreferencesInput,
    ) -> ServiceResult<PreferenceDocument> {
        let (user_id, settings) = input.resolve();
        let span = user_span!("save_preferences", user_id);

        async {
            let saved = self.preferences.upsert(&user_id, &settings, Utc::now()).await?;

            match self.cache.invalidate_namespace(GENERATE_NAMESPACE).await {
                Ok(removed) => debug!(removed, "Generation cache invalidated"),
                Err(e) => warn!(error = %e, "Failed to invalidate generation cache"),
            }

            info!("Preferences saved");
            Ok::<_, ServiceError>(saved)
        }
        .instrument(span)
        .await
    }

    /// 저장된 선호도를 조회합니다.
    pub async fn load_preferences(&self, user_id: &str) -> ServiceResult<PreferenceDocument> {
        self.preferences
            .get(user_id)
            .await?
            .ok_or_else(ServiceError::preferences_not_found)
    }

    /// 사용자 선호도로 인사이트를 생성합니다.
    ///
    /// 선호도가 없으면 `NotFound`. provider 실패는 에러가 아니라 대체 문구로 반환됩니다.
    pub async fn generate_for_user(&self, user_id: Option<&str>) -> ServiceResult<GenerationResult> {
        let user_id = resolve_user_id(user_id);
        let prefs = self.load_preferences(&user_id).await?;
        let key = generation_cache_key(&user_id, &prefs)?;
        let span = user_span!("generate", user_id, key);

        async {
            if let Some(text) = self.cache_lookup(&key, GENERATE_NAMESPACE).await {
                return Ok(GenerationResult {
                    user_id: user_id.clone(),
                    preferences: prefs.clone(),
                    response: text,
                    cached: true,
                });
            }

            let request = GenerationRequest::new(build_prompt(&prefs.settings));
            let outcome = self.run_chain(&request).await;

            // 대체 문구는 캐시하지 않음
            if let GenerationOutcome::Generated { text, .. } = &outcome {
                self.cache_store(&key, text).await;
            }
            let response = outcome.into_text();

            Ok(GenerationResult {
                user_id: user_id.clone(),
                preferences: prefs.clone(),
                response,
                cached: false,
            })
        }
        .instrument(span)
        .await
    }

    /// 톤/길이/차트 옵션에 맞춰 자유 프롬프트에 답합니다.
    ///
    /// generate와 달리 provider 실패를 에러로 반환합니다.
    pub async fn compose(&self, request: &ComposeRequest) -> ServiceResult<ComposeResponse> {
        let request = request.normalized();
        let key = fingerprint(COMPOSE_NAMESPACE, &request)?;

        if let Some(raw) = self.cache_lookup(&key, COMPOSE_NAMESPACE).await {
            match serde_json::from_str::<ComposeResponse>(&raw) {
                Ok(cached) => return Ok(cached),
                Err(e) => warn!(error = %e, "Discarding unreadable compose cache entry"),
            }
        }

        let system = build_compose_system_prompt(&request.tone, &request.length, request.include_charts);
        let generation = GenerationRequest::new(request.prompt.as_str())
            .with_system(system)
            .with_temperature(COMPOSE_TEMPERATURE);

        let text = match self.run_chain(&generation).await {
            GenerationOutcome::Generated { text, .. } => text,
            GenerationOutcome::Degraded { provider, reason } => {
                return Err(ServiceError::Upstream(format!("{} error: {}", provider, reason)));
            }
            GenerationOutcome::Unconfigured => {
                return Err(ServiceError::NotConfigured(
                    insight_provider::NO_PROVIDER_CONFIGURED.to_string(),
                ));
            }
        };

        let (text, chart_data) = extract_chart_json(&text);
        let response = ComposeResponse { text, chart_data };

        self.cache_store(&key, &serde_json::to_string(&response)?).await;
        Ok(response)
    }

    async fn run_chain(&self, request: &GenerationRequest) -> GenerationOutcome {
        let start = Instant::now();
        let outcome = self.providers.generate(request).await;
        let elapsed = start.elapsed().as_secs_f64();

        match &outcome {
            GenerationOutcome::Generated { provider, .. } => {
                record_generation(provider, "generated", elapsed)
            }
            GenerationOutcome::Degraded { provider, reason } => {
                warn!(provider, reason = %reason, "All providers failed");
                record_generation(provider, "degraded", elapsed)
            }
            GenerationOutcome::Unconfigured => {
                warn!("No AI provider configured");
                record_generation("none", "unconfigured", elapsed)
            }
        }

        outcome
    }

    async fn cache_lookup(&self, key: &str, namespace: &str) -> Option<String> {
        let value = match self.cache.get(key).await {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Cache lookup failed");
                None
            }
        };
        record_cache_lookup(namespace, value.is_some());
        value
    }

    async fn cache_store(&self, key: &str, value: &str) {
        if let Err(e) = self.cache.set(key, value, GENERATION_CACHE_TTL_SECS).await {
            warn!(error = %e, "Cache write failed");
        }
    }
}
