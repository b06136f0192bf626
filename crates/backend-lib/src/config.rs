// ============================
// crates/backend-lib/src/config.rs
// ============================
//! Configuration management.
use std::fmt;
use std::net::SocketAddr;
use std::path::Path;

use anyhow::{bail, Result};
use axum::http::HeaderValue;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::auth::{HashScheme, TokenAlgorithm, TokenIssuer};
use crate::storage::StoreUrl;

/// Config file read when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "accounts.toml";

/// Prefix of environment overrides, e.g. `ACCOUNTS_LOG_LEVEL`
pub const ENV_PREFIX: &str = "ACCOUNTS_";

/// Minimum signing secret length in bytes
pub const MIN_SECRET_LEN: usize = 32;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Application settings
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Server bind address
    pub bind_addr: SocketAddr,
    /// Replaces the port of `bind_addr` when set (`PORT`)
    pub port: Option<u16>,
    /// Credential store connection string (`memory:` or `file:<path>`)
    pub store_url: String,
    /// Log level
    pub log_level: String,
    pub log_format: LogFormat,
    /// HMAC secret for session tokens (`JWT_SECRET`)
    pub jwt_secret: String,
    pub token_algorithm: TokenAlgorithm,
    /// Scheme for new password hashes
    pub password_hash: HashScheme,
    /// Allowed browser origins; empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 5000)),
            port: None,
            store_url: "file:data".to_string(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            jwt_secret: String::new(),
            token_algorithm: TokenAlgorithm::HS256,
            password_hash: HashScheme::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("bind_addr", &self.bind_addr)
            .field("port", &self.port)
            .field("store_url", &self.store_url)
            .field("log_level", &self.log_level)
            .field("log_format", &self.log_format)
            .field("jwt_secret", &"<redacted>")
            .field("token_algorithm", &self.token_algorithm)
            .field("password_hash", &self.password_hash)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

impl Settings {
    /// Load settings from the default locations
    pub fn load() -> Result<Self> {
        load_settings(None)
    }

    /// Load settings using `path` as the config file
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        load_settings(Some(path.as_ref()))
    }

    /// Address the server listens on
    pub fn listen_addr(&self) -> SocketAddr {
        let mut addr = self.bind_addr;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        addr
    }

    /// Token issuer built from the signing settings
    pub fn token_issuer(&self) -> TokenIssuer {
        TokenIssuer::new(self.jwt_secret.as_bytes(), self.token_algorithm)
    }

    /// Check that the settings are usable
    pub fn validate(&self) -> Result<()> {
        if !LOG_LEVELS.contains(&self.log_level.to_ascii_lowercase().as_str()) {
            bail!("invalid log level '{}'", self.log_level);
        }

        if self.jwt_secret.len() < MIN_SECRET_LEN {
            bail!("jwt_secret must be at least {MIN_SECRET_LEN} bytes");
        }

        match self.password_hash {
            HashScheme::Bcrypt { cost } if !(10..=31).contains(&cost) => {
                bail!("bcrypt cost must be between 10 and 31, got {cost}");
            },
            HashScheme::Scrypt { log_n } if !(14..=20).contains(&log_n) => {
                bail!("scrypt log_n must be between 14 and 20, got {log_n}");
            },
            _ => {},
        }

        if let Err(e) = StoreUrl::parse(&self.store_url) {
            bail!("invalid store_url: {e}");
        }

        for origin in &self.cors_origins {
            if HeaderValue::from_str(origin).is_err() {
                bail!("invalid CORS origin '{origin}'");
            }
        }

        Ok(())
    }
}

/// Load settings from various sources.
///
/// Later sources win: defaults, the TOML file, `ACCOUNTS_*` variables
/// (nested keys separated by `__`), then the bare `PORT`, `JWT_SECRET`
/// and `STORE_URL` variables.
pub fn load_settings(path: Option<&Path>) -> Result<Settings> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let settings = Figment::from(Serialized::defaults(Settings::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(ENV_PREFIX).split("__"))
        .merge(Env::raw().only(&["PORT", "JWT_SECRET", "STORE_URL"]))
        .extract()?;

    Ok(settings)
}
