//! primary → fallback provider 체인.

use std::sync::Arc;
use tracing::{info, warn};

use crate::types::{GenerationProvider, GenerationRequest};

/// 설정된 provider가 하나도 없을 때 반환되는 문구.
pub const NO_PROVIDER_CONFIGURED: &str = "No AI provider configured.";

/// 생성 결과.
///
/// 실제 답변과 실패 대체 문구를 호출자가 구분할 수 있도록 태그를 유지합니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    /// provider가 텍스트를 생성함
    Generated { provider: &'static str, text: String },
    /// 마지막으로 시도한 provider가 실패함
    Degraded { provider: &'static str, reason: String },
    /// 설정된 provider 없음
    Unconfigured,
}

impl GenerationOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, GenerationOutcome::Generated { .. })
    }

    /// 사용자에게 반환할 텍스트로 평탄화합니다.
    ///
    /// 실패는 `"<Provider> call failed: <reason>"`, 미설정은 고정 문구가 됩니다.
    pub fn into_text(self) -> String {
        match self {
            GenerationOutcome::Generated { text, .. } => text,
            GenerationOutcome::Degraded { provider, reason } => {
                format!("{} call failed: {}", provider, reason)
            }
            GenerationOutcome::Unconfigured => NO_PROVIDER_CONFIGURED.to_string(),
        }
    }
}

/// provider 선택 정책.
///
/// primary가 설정되어 있으면 먼저 호출하고, 실패(에러, 타임아웃, 빈 응답)하거나
/// 설정되지 않았으면 fallback을 호출합니다.
#[derive(Clone, Default)]
pub struct ProviderChain {
    primary: Option<Arc<dyn GenerationProvider>>,
    fallback: Option<Arc<dyn GenerationProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_primary(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.primary = Some(provider);
        self
    }

    pub fn with_fallback(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.fallback = Some(provider);
        self
    }

    pub fn is_configured(&self) -> bool {
        self.primary.is_some() || self.fallback.is_some()
    }

    /// 설정된 provider 이름 목록 (호출 순서).
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers().map(|p| p.name()).collect()
    }

    fn providers(&self) -> impl Iterator<Item = &Arc<dyn GenerationProvider>> {
        self.primary.iter().chain(self.fallback.iter())
    }

    /// 체인 순서대로 생성을 시도합니다.
    pub async fn generate(&self, request: &GenerationRequest) -> GenerationOutcome {
        let mut outcome = GenerationOutcome::Unconfigured;

        for provider in self.providers() {
            match provider.generate(request).await {
                Ok(text) => {
                    info!(provider = provider.name(), "Generation succeeded");
                    return GenerationOutcome::Generated {
                        provider: provider.name(),
                        text,
                    };
                }
                Err(e) => {
                    warn!(provider = provider.name(), error = %e, "Generation failed");
                    outcome = GenerationOutcome::Degraded {
                        provider: provider.name(),
                        reason: e.to_string(),
                    };
                }
            }
        }

        outcome
    }
}
