//! # papers-auth
//!
//! Credential handling for Papers: Argon2id password hashes and HS256
//! bearer tokens whose subject is the user id.

pub mod jwt;
pub mod password;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
pub use password::PasswordHasher;
