//! Server configuration.
//!
//! All configuration is driven by environment variables.

use anyhow::{Context, Result, bail};
use tfg_auth::StaticSecretStore;
use tfg_auth::freshness::DEFAULT_FRESHNESS_WINDOW;
use tfg_auth_http::service::DEFAULT_MAX_BODY_BYTES;

/// Configuration for the TFG gateway.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address.
    pub listen: String,
    /// Log level filter.
    pub log_level: String,
    /// Scheme used to rebuild signed URLs.
    pub default_scheme: String,
    /// Freshness window in seconds.
    pub freshness_window: i64,
    /// Largest request body buffered for verification.
    pub max_body_bytes: usize,
    /// Shared secrets per client.
    pub client_secrets: StaticSecretStore,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8080".to_owned(),
            log_level: "info".to_owned(),
            default_scheme: "http".to_owned(),
            freshness_window: DEFAULT_FRESHNESS_WINDOW,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            client_secrets: StaticSecretStore::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("TFG_LISTEN") {
            config.listen = v;
        }
        if let Some(v) = lookup("LOG_LEVEL") {
            config.log_level = v;
        }
        if let Some(v) = lookup("TFG_DEFAULT_SCHEME") {
            let v = v.trim().to_ascii_lowercase();
            if v != "http" && v != "https" {
                bail!("TFG_DEFAULT_SCHEME must be http or https, got {v:?}");
            }
            config.default_scheme = v;
        }
        if let Some(v) = lookup("TFG_FRESHNESS_WINDOW_SECS") {
            config.freshness_window = v
                .trim()
                .parse()
                .with_context(|| format!("invalid TFG_FRESHNESS_WINDOW_SECS: {v:?}"))?;
            if config.freshness_window <= 0 {
                bail!("TFG_FRESHNESS_WINDOW_SECS must be positive");
            }
        }
        if let Some(v) = lookup("TFG_MAX_BODY_BYTES") {
            config.max_body_bytes = v
                .trim()
                .parse()
                .with_context(|| format!("invalid TFG_MAX_BODY_BYTES: {v:?}"))?;
        }
        if let Some(v) = lookup("TFG_CLIENT_SECRETS") {
            config.client_secrets = parse_client_secrets(&v)?;
        }

        Ok(config)
    }
}

/// Parse `client=secret` pairs separated by commas.
///
/// Only the first `=` splits a pair, so secrets may contain `=` (e.g. base64).
fn parse_client_secrets(raw: &str) -> Result<StaticSecretStore> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (client, secret) = entry
                .split_once('=')
                .context("TFG_CLIENT_SECRETS entries must be client=secret")?;
            if client.is_empty() || secret.is_empty() {
                bail!("TFG_CLIENT_SECRETS entries need a client and a secret");
            }
            Ok((client.to_owned(), secret.to_owned()))
        })
        .collect::<Result<Vec<_>>>()
        .map(StaticSecretStore::new)
}
