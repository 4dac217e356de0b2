pub mod otp;
pub mod token;

pub use otp::{generate_code, hash_code};
pub use token::{issue_token, verify_token, Claims};
