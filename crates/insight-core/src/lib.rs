//! # Insight Core
//!
//! 인사이트 서비스의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 서비스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 사용자 선호도 문서 및 열거형 필드
//! - 선호도 기반 프롬프트 빌더
//! - 캐시 키 fingerprint
//! - 저장소/캐시 추상화 trait
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
