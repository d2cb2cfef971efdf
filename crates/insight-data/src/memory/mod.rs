//! 인메모리 저장소 구현.
//!
//! 외부 서비스 없이 파이프라인을 실행하거나 테스트할 때 사용합니다.
//! `unreachable()`로 생성하면 모든 호출이 실패하여 장애 상황을 재현합니다.

mod accounts;
mod cache;
mod preferences;

pub use accounts::InMemoryAccountStore;
pub use cache::InMemoryResponseCache;
pub use preferences::InMemoryPreferenceStore;
