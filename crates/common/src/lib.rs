// ================
// crates/common/src/lib.rs
// ================
//! Common types and structures
//! used for communication between the accounts client and server.
//! This module defines the JSON bodies of the `/api` endpoints.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Account identifier
pub type AccountId = Uuid;

/// Body of `POST /api/register`
///
/// Missing fields deserialize as empty strings so the server can answer
/// with a validation message instead of a decoder error.
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct RegisterRequest {
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Date of birth, `YYYY-MM-DD` or an RFC 3339 timestamp
    #[serde(default)]
    pub dob: String,
    /// Login email, unique and case-sensitive
    #[serde(default)]
    pub email: String,
    /// Raw password
    #[serde(default)]
    pub password: String,
}

/// Body of `POST /api/login`
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl fmt::Debug for RegisterRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterRequest")
            .field("name", &self.name)
            .field("dob", &self.dob)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public view of an account. Never carries the password hash.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    /// Serialized as `YYYY-MM-DD`
    pub dob: NaiveDate,
}

/// Successful register/login response
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct AuthResponse {
    /// Signed session token, valid for one hour
    pub token: String,
    pub user: UserProfile,
}

/// Plain `{ "message": ... }` body, used by the protected route
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct MessageResponse {
    pub message: String,
}

/// Error body returned by every failing endpoint
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorBody {
    /// Human readable message, safe to show to the user
    pub message: String,
    /// Stable machine readable code, e.g. `AUTH_001`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}
