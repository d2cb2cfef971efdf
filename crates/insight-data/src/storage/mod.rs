//! 영속 저장소 및 캐시 백엔드.

pub mod accounts;
pub mod postgres;
pub mod preferences;
pub mod redis;
