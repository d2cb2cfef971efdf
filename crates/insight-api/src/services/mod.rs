//! 요청 처리 서비스 모듈.

pub mod generation;

pub use generation::{ComposeRequest, ComposeResponse, GenerationResult, GenerationService};
