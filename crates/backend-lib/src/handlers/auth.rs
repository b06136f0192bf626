// ============================
// crates/backend-lib/src/handlers/auth.rs
// ============================
//! Account registration, login and the protected probe route.
use accounts_common::{AuthResponse, LoginRequest, MessageResponse, RegisterRequest};
use axum::{extract::State, http::StatusCode, Extension, Json};

use super::ApiJson;
use crate::{error::AppError, middleware::AuthenticatedAccount, AppState};

/// `POST /api/register`
pub async fn register(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let response = state.auth.register(req).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// `POST /api/login`
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let response = state.auth.login(req).await?;
    Ok(Json(response))
}

/// `GET /api/protected`, only reachable through the auth guard
pub async fn protected(
    Extension(AuthenticatedAccount(account_id)): Extension<AuthenticatedAccount>,
) -> Json<MessageResponse> {
    tracing::debug!(%account_id, "protected route accessed");
    Json(MessageResponse {
        message: "This is a protected route".to_string(),
    })
}
