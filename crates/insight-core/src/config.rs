//! 설정 관리.
//!
//! 기본값 위에 환경 변수를 덮어써서 애플리케이션 설정을 구성합니다.
//! 환경 변수 이름은 필드 이름의 대문자 형태입니다 (`database_url` → `DATABASE_URL`).

use secrecy::SecretString;
use serde::Deserialize;

/// 생성 결과 캐시 TTL (초).
pub const GENERATION_CACHE_TTL_SECS: u64 = 600;

/// 세션 토큰 유효 기간 (일).
pub const SESSION_TTL_DAYS: i64 = 7;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// 바인딩할 호스트
    pub api_host: String,
    /// 리스닝할 포트
    pub api_port: u16,

    /// PostgreSQL URL (미설정 시 저장소 기능 비활성화)
    #[serde(default)]
    pub database_url: Option<String>,
    /// 풀의 최대 연결 수
    pub database_max_connections: u32,

    /// Redis URL (미설정 시 캐시 비활성화)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Gemini API 키 (primary provider)
    #[serde(default)]
    pub gemini_api_key: Option<String>,
    /// Gemini 모델 이름
    pub gemini_model: String,
    /// Gemini API 기본 URL
    pub gemini_base_url: String,

    /// OpenAI API 키 (fallback provider)
    #[serde(default)]
    pub openai_api_key: Option<String>,
    /// OpenAI 모델 이름
    pub openai_model: String,
    /// OpenAI API 기본 URL
    pub openai_base_url: String,

    /// AI provider 호출 타임아웃 (초)
    pub provider_timeout_secs: u64,

    /// Tavily 검색 API 키
    #[serde(default)]
    pub tavily_api_key: Option<String>,
    /// Tavily 검색 API URL
    pub tavily_base_url: String,
    /// 뉴스 검색 타임아웃 (초)
    pub news_timeout_secs: u64,

    /// 쉼표로 구분된 허용 CORS origin
    #[serde(default)]
    pub cors_origins: Option<String>,

    /// 데모용 고정 OTP (미설정 시 무작위 6자리)
    #[serde(default)]
    pub auth_demo_otp: Option<String>,
}

impl AppConfig {
    /// 기본값과 환경 변수에서 설정을 로드합니다.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from(config::Environment::default())
    }

    /// 주어진 환경 소스로 설정을 로드합니다.
    ///
    /// 값은 문자열로 읽고 숫자 필드만 역직렬화 시점에 변환하므로
    /// `012345` 같은 OTP나 숫자형 키가 그대로 유지됩니다.
    fn load_from(environment: config::Environment) -> Result<Self, config::ConfigError> {
        Self::builder()?
            .add_source(environment)
            .build()?
            .try_deserialize()
    }

    /// 기본값만 설정된 빌더를 반환합니다.
    ///
    /// 테스트에서는 여기에 `set_override`를 추가하여 사용합니다.
    pub fn builder(
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        config::Config::builder()
            .set_default("api_host", "127.0.0.1")?
            .set_default("api_port", 8000)?
            .set_default("database_max_connections", 10)?
            .set_default("gemini_model", "gemini-1.5-pro")?
            .set_default(
                "gemini_base_url",
                "https://generativelanguage.googleapis.com/v1beta",
            )?
            .set_default("openai_model", "gpt-4o-mini")?
            .set_default("openai_base_url", "https://api.openai.com/v1")?
            .set_default("provider_timeout_secs", 10)?
            .set_default("tavily_base_url", "https://api.tavily.com")?
            .set_default("news_timeout_secs", 10)
    }

    /// 소켓 주소 문자열 (`host:port`).
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }

    /// Gemini API 키 (빈 문자열은 미설정으로 취급).
    pub fn gemini_key(&self) -> Option<SecretString> {
        non_empty_secret(self.gemini_api_key.as_deref())
    }

    /// OpenAI API 키 (빈 문자열은 미설정으로 취급).
    pub fn openai_key(&self) -> Option<SecretString> {
        non_empty_secret(self.openai_api_key.as_deref())
    }

    /// Tavily API 키 (빈 문자열은 미설정으로 취급).
    pub fn tavily_key(&self) -> Option<SecretString> {
        non_empty_secret(self.tavily_api_key.as_deref())
    }

    /// 허용 CORS origin 목록. 비어 있으면 모든 origin 허용.
    pub fn cors_origin_list(&self) -> Vec<String> {
        self.cors_origins
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

fn non_empty_secret(value: Option<&str>) -> Option<SecretString> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(|v| SecretString::new(v.to_string().into()))
}
