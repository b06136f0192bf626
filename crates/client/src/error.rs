//! Client-side error type.
use thiserror::Error;

/// Failure of a session client operation.
///
/// The `Display` text is what the user gets to see.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Rejected locally before any request was sent
    #[error("{0}")]
    Validation(String),

    /// Non-success response, carrying the server-supplied message
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("The server took too long to respond")]
    NetworkTimeout,

    #[error("Network error: {0}")]
    Network(String),

    /// A login or register call is still outstanding
    #[error("A request is already in progress")]
    SubmissionInFlight,

    /// No valid session; the caller should show [`crate::Route::Login`]
    #[error("Please log in to continue")]
    LoginRequired,
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ClientError::NetworkTimeout
        } else {
            ClientError::Network(err.to_string())
        }
    }
}
