//! Application configuration loaded from environment variables.

use std::num::NonZeroU32;
use std::time::Duration;

use saga::{CompensationMode, SagaConfig};

/// Server configuration with sensible defaults.
///
/// Reads from environment variables:
/// - `HOST`: bind address (default: `"0.0.0.0"`)
/// - `PORT`: listen port (default: `3000`)
/// - `RUST_LOG`: tracing filter directive (default: `"info"`)
/// - `SAGA_COMPENSATION_MODE`: `sequential` or `parallel` (default: `sequential`)
/// - `SAGA_RETRY_INITIAL_MS`: first backoff delay (default: `1000`)
/// - `SAGA_RETRY_MAX_MS`: backoff cap (default: `60000`)
/// - `SAGA_RETRY_MAX_ATTEMPTS`: attempts per activity (default: `3`)
///
/// Unparseable values fall back to the default.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub log_level: String,
    pub saga: SagaConfig,
}

impl Config {
    /// Loads configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let mut saga = defaults.saga;
        if let Some(mode) = var("SAGA_COMPENSATION_MODE") {
            match mode.parse::<CompensationMode>() {
                Ok(mode) => saga.compensation_mode = mode,
                Err(err) => tracing::warn!(error = %err, "ignoring SAGA_COMPENSATION_MODE"),
            }
        }

        let policy = &mut saga.activity.retry_policy;
        if let Some(ms) = var("SAGA_RETRY_INITIAL_MS").and_then(|v| v.parse().ok()) {
            policy.initial_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = var("SAGA_RETRY_MAX_MS").and_then(|v| v.parse().ok()) {
            policy.maximum_interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = var("SAGA_RETRY_MAX_ATTEMPTS")
            .and_then(|v| v.parse().ok())
            .and_then(NonZeroU32::new)
        {
            policy.maximum_attempts = attempts;
        }

        Self {
            host: var("HOST").unwrap_or(defaults.host),
            port: var("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            log_level: var("RUST_LOG").unwrap_or(defaults.log_level),
            saga,
        }
    }

    /// Returns the `"host:port"` bind address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            log_level: "info".to_string(),
            saga: SagaConfig::default(),
        }
    }
}
