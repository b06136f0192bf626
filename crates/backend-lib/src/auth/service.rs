use accounts_common::{AccountId, AuthResponse, LoginRequest, RegisterRequest};
use async_trait::async_trait;

use crate::error::AppError;

/// Registration, login and token verification
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and return a session token for it
    async fn register(&self, req: RegisterRequest) -> Result<AuthResponse, AppError>;

    /// Check credentials and return a fresh session token
    async fn login(&self, req: LoginRequest) -> Result<AuthResponse, AppError>;

    /// Resolve a session token to the account it was issued for
    fn verify(&self, token: &str) -> Result<AccountId, AppError>;
}
