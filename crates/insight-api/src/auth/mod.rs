//! 인증.
//!
//! - `password`: Argon2 비밀번호 해싱
//! - `session`: bearer 세션 토큰, OTP, 인증 사용자 추출기

mod password;
mod session;

pub use password::{hash_password, verify_password, PasswordError};
pub use session::{generate_access_token, issue_otp, parse_bearer, CurrentUser};
