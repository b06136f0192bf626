// crates/backend-lib/src/error.rs

//! Central error type + Axum integration.
use accounts_common::ErrorBody;
use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::auth::{PasswordError, TokenError};
use crate::storage::StoreError;
use crate::validation::ValidationError;

/// Message shared by every credential failure on login.
pub const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Message returned when registering an email that is already taken.
pub const ACCOUNT_EXISTS: &str = "User already exists";

/// Application error types with error codes and context
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Account already exists")]
    AccountExists,

    /// Unknown email and wrong password both end up here
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Token expired")]
    ExpiredToken,

    #[error("Invalid request body: {0}")]
    BadRequest(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Password hashing error: {0}")]
    Password(#[from] PasswordError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_)
            | AppError::AccountExists
            | AppError::InvalidCredentials
            | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::MissingToken | AppError::InvalidToken | AppError::ExpiredToken => {
                StatusCode::UNAUTHORIZED
            },
            AppError::Store(_) | AppError::Password(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VAL_001",
            AppError::BadRequest(_) => "VAL_002",
            AppError::AccountExists => "ACCT_001",
            AppError::InvalidCredentials => "AUTH_001",
            AppError::MissingToken => "AUTH_002",
            AppError::InvalidToken => "AUTH_003",
            AppError::ExpiredToken => "AUTH_004",
            AppError::Store(_) => "STORE_001",
            AppError::Password(_) => "INT_002",
            AppError::Internal(_) => "INT_001",
        }
    }

    /// Message that is safe to hand to the client.
    ///
    /// Server-side failures collapse to a generic message; the detail only
    /// reaches the logs.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(e) => e.to_string(),
            AppError::BadRequest(_) => "Invalid request body".to_string(),
            AppError::AccountExists => ACCOUNT_EXISTS.to_string(),
            AppError::InvalidCredentials => INVALID_CREDENTIALS.to_string(),
            AppError::MissingToken => "Authentication required".to_string(),
            AppError::InvalidToken => "Invalid token".to_string(),
            AppError::ExpiredToken => "Token expired".to_string(),
            AppError::Store(_) | AppError::Password(_) | AppError::Internal(_) => {
                "Internal server error".to_string()
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, code = self.error_code(), "request failed");
        }

        let body = ErrorBody {
            message: self.public_message(),
            code: Some(self.error_code().to_string()),
        };

        (status, Json(body)).into_response()
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Expired => AppError::ExpiredToken,
            TokenError::Invalid(_) => AppError::InvalidToken,
            TokenError::Signing(msg) => AppError::Internal(msg),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Internal(format!("blocking task failed: {err}"))
    }
}
