// crates/backend-lib/src/middleware/mod.rs

//! Middleware for the accounts server.

pub mod auth;

pub use auth::{require_auth, AuthenticatedAccount};
