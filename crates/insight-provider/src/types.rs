//! 생성 provider 타입 및 trait 정의.

use async_trait::async_trait;

/// 생성 요청.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// 사용자 프롬프트
    pub prompt: String,
    /// 시스템 지시문
    pub system: Option<String>,
    /// 샘플링 temperature (미지정 시 provider 기본값)
    pub temperature: Option<f32>,
}

impl GenerationRequest {
    /// 프롬프트만 있는 요청을 생성합니다.
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            temperature: None,
        }
    }

    /// 시스템 지시문을 설정합니다.
    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }

    /// temperature를 설정합니다.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// provider 작업용 Result 타입.
pub type ProviderResult<T> = Result<T, ProviderError>;

/// provider 에러.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("No text returned by {0}.")]
    EmptyResponse(&'static str),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ProviderError {
    /// reqwest 에러를 타임아웃 여부에 따라 분류합니다.
    pub fn from_request(err: reqwest::Error, timeout_secs: u64) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(timeout_secs)
        } else {
            ProviderError::Network(err)
        }
    }
}

/// 텍스트 생성 provider trait.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// 텍스트를 생성합니다.
    ///
    /// 빈 응답은 `ProviderError::EmptyResponse`로 반환해야 합니다.
    async fn generate(&self, request: &GenerationRequest) -> ProviderResult<String>;

    /// 사용자에게 노출되는 provider 이름.
    fn name(&self) -> &'static str;
}
