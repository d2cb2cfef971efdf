//! 인사이트 서비스의 도메인 모델.

mod account;
mod fingerprint;
mod preference;
mod prompt;
mod store;

pub use account::*;
pub use fingerprint::*;
pub use preference::*;
pub use prompt::*;
pub use store::*;
