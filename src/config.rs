//! Configuration management for ai-todo.
//!
//! Configuration can be set via environment variables:
//! - `HOST` - Optional. Server host. Defaults to `127.0.0.1`.
//! - `PORT` - Optional. Server port. Defaults to `3000`.
//! - `BREAKDOWN_API_URL` - Optional. Base URL of a remote breakdown service.
//!   When unset, the built-in keyword breakdown is used.
//! - `BREAKDOWN_TIMEOUT_SECS` - Optional. Timeout for remote breakdown calls. Defaults to `30`.
//! - `BREAKDOWN_MOCK_DELAY_MS` - Optional. Artificial delay of the keyword breakdown. Defaults to `1000`.
//! - `CORS_PERMISSIVE` - Optional. Allow any origin. Defaults to `true`.

use std::time::Duration;
use thiserror::Error;

use crate::util::env_var_bool;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Breakdown gateway configuration.
#[derive(Debug, Clone)]
pub struct BreakdownConfig {
    /// Remote breakdown service base URL (e.g. `http://localhost:8000`)
    pub api_url: Option<String>,

    /// Per-request timeout for the remote service
    pub timeout: Duration,

    /// Delay applied by the keyword breakdown before answering
    pub mock_delay: Duration,
}

impl Default for BreakdownConfig {
    fn default() -> Self {
        Self {
            api_url: None,
            timeout: Duration::from_secs(30),
            mock_delay: Duration::from_millis(1000),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Allow cross-origin requests from any origin
    pub cors_permissive: bool,

    pub breakdown: BreakdownConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let host = std::env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string());

        let port = parse_env("PORT", 3000u16)?;

        let api_url = std::env::var("BREAKDOWN_API_URL")
            .ok()
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty());

        let breakdown = BreakdownConfig {
            api_url,
            timeout: Duration::from_secs(parse_env("BREAKDOWN_TIMEOUT_SECS", 30u64)?),
            mock_delay: Duration::from_millis(parse_env("BREAKDOWN_MOCK_DELAY_MS", 1000u64)?),
        };

        Ok(Self {
            host,
            port,
            cors_permissive: env_var_bool("CORS_PERMISSIVE", true),
            breakdown,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(breakdown: BreakdownConfig) -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            cors_permissive: true,
            breakdown,
        }
    }
}

fn parse_env<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        Err(_) => Ok(default),
    }
}
