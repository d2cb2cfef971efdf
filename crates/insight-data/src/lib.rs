//! 저장소 및 캐시 구현.
//!
//! 이 crate는 다음을 제공합니다:
//! - PostgreSQL 연결 풀과 마이그레이션
//! - 선호도/계정 repository
//! - Redis 응답 캐시
//! - 테스트와 로컬 실행을 위한 인메모리 구현

pub mod error;
pub mod memory;
pub mod storage;

pub use error::{DataError, Result};

pub use memory::{InMemoryAccountStore, InMemoryPreferenceStore, InMemoryResponseCache};
pub use storage::postgres::{Database, DatabaseConfig};
pub use storage::preferences::PgPreferenceStore;
pub use storage::accounts::PgAccountStore;
pub use storage::redis::{RedisCache, RedisConfig};
