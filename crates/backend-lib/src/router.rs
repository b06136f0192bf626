// ============================
// crates/backend-lib/src/router.rs
// ============================
//! HTTP router for the `/api` surface.
use axum::{
    http::{header, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::auth::{login, protected, register};
use crate::middleware::require_auth;
use crate::AppState;

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    // Every route added here sits behind the bearer guard.
    let protected_routes = Router::new()
        .route("/api/protected", get(protected))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&state.settings.cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    if origins.is_empty() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect();
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}
