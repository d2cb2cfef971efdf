//! 텍스트 생성 provider 및 뉴스 검색 클라이언트.
//!
//! 이 crate는 다음을 제공합니다:
//! - 생성 provider 추상화 (`GenerationProvider`)
//! - Gemini (primary), OpenAI (fallback) 구현
//! - primary → fallback 순서로 호출하는 `ProviderChain`
//! - Tavily 뉴스 검색 클라이언트

pub mod chain;
pub mod gemini;
pub mod news;
pub mod openai;
pub mod types;

pub use chain::{GenerationOutcome, ProviderChain, NO_PROVIDER_CONFIGURED};
pub use gemini::{GeminiConfig, GeminiProvider};
pub use news::{clamp_max_results, NewsError, NewsItem, NewsSearch, TavilyClient, TavilyConfig};
pub use openai::{OpenAiConfig, OpenAiProvider};
pub use types::{GenerationProvider, GenerationRequest, ProviderError, ProviderResult};
