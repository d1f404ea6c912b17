//! Runtime configuration sourced from environment variables.
//!
//! Every key is optional; defaults reproduce the demo's behavior (local
//! endpoint, no request timeout, playback never cancelled on re-open).

use std::time::Duration;

use aether_upload::{DEFAULT_PREDICT_ENDPOINT, validate_endpoint};
use thiserror::Error;

/// Prediction endpoint URL.
pub const ENV_ENDPOINT: &str = "AETHER_PREDICT_ENDPOINT";
/// Request timeout in milliseconds; unset or `0` disables it.
pub const ENV_REQUEST_TIMEOUT_MS: &str = "AETHER_REQUEST_TIMEOUT_MS";
/// Whether re-opening the report cancels the previous playback.
pub const ENV_CANCEL_PLAYBACK_ON_REOPEN: &str = "AETHER_CANCEL_PLAYBACK_ON_REOPEN";
/// Log verbosity, 0 (error) to 4 (trace).
pub const ENV_LOG_VERBOSITY: &str = "AETHER_LOG_VERBOSITY";

const DEFAULT_LOG_VERBOSITY: u8 = 2;

/// Resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Validated prediction endpoint.
    pub endpoint: String,
    /// Optional bound on the prediction request.
    pub request_timeout: Option<Duration>,
    /// Cancel a still-running playback when the report is opened again.
    pub cancel_playback_on_reopen: bool,
    /// Log verbosity passed to [`crate::logging::init_logging`].
    pub log_verbosity: u8,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_PREDICT_ENDPOINT.to_string(),
            request_timeout: None,
            cancel_playback_on_reopen: false,
            log_verbosity: DEFAULT_LOG_VERBOSITY,
        }
    }
}

impl AppConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    /// See [`AppConfig::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidEndpoint`] for an endpoint that fails URL
    /// policy and [`ConfigError::InvalidValue`] for unparsable numbers or
    /// booleans.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(endpoint) = non_blank(lookup(ENV_ENDPOINT)) {
            validate_endpoint(&endpoint)
                .map_err(|error| ConfigError::InvalidEndpoint(error.to_string()))?;
            config.endpoint = endpoint;
        }

        if let Some(raw) = non_blank(lookup(ENV_REQUEST_TIMEOUT_MS)) {
            let millis: u64 = raw
                .parse()
                .map_err(|_| ConfigError::invalid(ENV_REQUEST_TIMEOUT_MS, &raw))?;
            config.request_timeout = (millis > 0).then(|| Duration::from_millis(millis));
        }

        if let Some(raw) = non_blank(lookup(ENV_CANCEL_PLAYBACK_ON_REOPEN)) {
            config.cancel_playback_on_reopen = parse_flag(&raw)
                .ok_or_else(|| ConfigError::invalid(ENV_CANCEL_PLAYBACK_ON_REOPEN, &raw))?;
        }

        if let Some(raw) = non_blank(lookup(ENV_LOG_VERBOSITY)) {
            config.log_verbosity = raw
                .parse()
                .map_err(|_| ConfigError::invalid(ENV_LOG_VERBOSITY, &raw))?;
        }

        Ok(config)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Parses `1/true/on/yes` and `0/false/off/no`, case-insensitively.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Endpoint failed URL policy.
    #[error("invalid AETHER_PREDICT_ENDPOINT: {0}")]
    InvalidEndpoint(String),
    /// A value could not be parsed.
    #[error("invalid value '{value}' for {key}")]
    InvalidValue {
        /// Environment key.
        key: &'static str,
        /// Raw value.
        value: String,
    },
}

impl ConfigError {
    fn invalid(key: &'static str, value: &str) -> Self {
        Self::InvalidValue {
            key,
            value: value.to_string(),
        }
    }
}
