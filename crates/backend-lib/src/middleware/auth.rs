//! Bearer-token guard for protected routes.
use accounts_common::AccountId;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{error::AppError, AppState};

/// Account resolved from a verified bearer token, stored in request extensions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedAccount(pub AccountId);

/// Reject the request unless it carries a valid `Authorization: Bearer` token
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let account_id = {
        let token = bearer_token(request.headers())?;
        state.auth.verify(token)?
    };

    request.extensions_mut().insert(AuthenticatedAccount(account_id));
    Ok(next.run(request).await)
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers.get(AUTHORIZATION).ok_or(AppError::MissingToken)?;
    let value = value.to_str().map_err(|_| AppError::InvalidToken)?;
    let (scheme, token) = value.trim().split_once(' ').ok_or(AppError::InvalidToken)?;

    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(AppError::InvalidToken);
    }
    Ok(token)
}
