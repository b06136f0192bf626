// ============================
// crates/backend-lib/src/lib.rs
// ============================
//! Core backend-lib functionality for the accounts server.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod router;
pub mod storage;
pub mod validation;

use std::sync::Arc;

use crate::auth::{AuthService, DefaultAuth};
use crate::config::Settings;
use crate::storage::open_store;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Authentication service
    pub auth: Arc<dyn AuthService>,
    /// Settings the server was started with
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create a new application state
    pub fn new(auth: Arc<dyn AuthService>, settings: Settings) -> Self {
        Self {
            auth,
            settings: Arc::new(settings),
        }
    }

    /// Validate `settings`, open the configured credential store and wire
    /// the default auth service on top of it
    pub async fn from_settings(settings: Settings) -> Result<Self, anyhow::Error> {
        settings.validate()?;

        let store = open_store(&settings.store_url)?;
        let auth = DefaultAuth::new(store, settings.token_issuer(), settings.password_hash);
        auth.warm_up()
            .await
            .map_err(|e| anyhow::anyhow!("failed to prepare password hashing: {e}"))?;

        Ok(Self::new(Arc::new(auth), settings))
    }
}
