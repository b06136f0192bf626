// ============================
// crates/client/src/lib.rs
// ============================
//! Session client for the accounts server.
//!
//! A [`SessionClient`] owns the session of one user agent: the current
//! profile and token, the login/register/logout operations, and the
//! gate in front of protected views.

pub mod error;
pub mod notice;
pub mod route;
pub mod session;

pub use error::ClientError;
pub use notice::{Notice, NoticeLevel};
pub use route::Route;
pub use session::{ClientConfig, SessionClient, SessionState, DEFAULT_TIMEOUT};
