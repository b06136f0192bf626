// ============================
// crates/backend-lib/src/auth/mod.rs
// ============================
//! Authentication module.

pub mod password;
pub mod token;
mod service;
mod service_impl;

pub use password::{hash_password, verify_password, HashScheme, PasswordError};
pub use service::AuthService;
pub use service_impl::DefaultAuth;
pub use token::{Claims, TokenAlgorithm, TokenError, TokenIssuer, TOKEN_TTL_SECS};
