//! Pinner configuration parsed from environment variables.

use std::path::PathBuf;

pub const ACCESS_TOKEN_VAR: &str = "PINTEREST_ACCESS_TOKEN";
pub const DEFAULT_API_BASE_URL: &str = "https://api.pinterest.com/v5";
pub const DEFAULT_BOARD_CACHE_PATH: &str = ".bulk-pinner/boards.json";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_MAX_CONCURRENT_PINS: usize = 4;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing access token: env var {var} not set")]
    MissingToken { var: String },
    #[error("config parse failed: {0}")]
    Parse(String),
}

impl ConfigError {
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingToken { .. } => "E_MISSING_TOKEN",
            Self::Parse(_) => "E_CONFIG_PARSE",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RemoteTimeouts {
    pub request_secs: u64,
    pub connect_secs: u64,
}

impl Default for RemoteTimeouts {
    fn default() -> Self {
        Self { request_secs: DEFAULT_REQUEST_TIMEOUT_SECS, connect_secs: DEFAULT_CONNECT_TIMEOUT_SECS }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PinnerConfig {
    pub access_token: String,
    pub api_base_url: String,
    pub board_cache_path: PathBuf,
    pub timeouts: RemoteTimeouts,
    pub max_concurrent_pins: usize,
}

impl PinnerConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `PINTEREST_ACCESS_TOKEN`
    ///
    /// Optional:
    /// - `PINTEREST_API_BASE_URL`: default `https://api.pinterest.com/v5`
    /// - `PINNER_BOARD_CACHE_PATH`: default `.bulk-pinner/boards.json`
    /// - `PINTEREST_REQUEST_TIMEOUT_SECS`: default 60
    /// - `PINTEREST_CONNECT_TIMEOUT_SECS`: default 10
    /// - `PINTEREST_MAX_CONCURRENT_PINS`: default 4, must be positive
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or the concurrency limit is zero.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`PinnerConfig::from_env`], reading values through `lookup`.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is missing or the concurrency limit is zero.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let access_token = lookup(ACCESS_TOKEN_VAR)
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingToken { var: ACCESS_TOKEN_VAR.into() })?;

        let api_base_url = lookup("PINTEREST_API_BASE_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();
        let board_cache_path =
            PathBuf::from(lookup("PINNER_BOARD_CACHE_PATH").unwrap_or_else(|| DEFAULT_BOARD_CACHE_PATH.to_string()));
        let timeouts = RemoteTimeouts {
            request_secs: parse_or(lookup("PINTEREST_REQUEST_TIMEOUT_SECS"), DEFAULT_REQUEST_TIMEOUT_SECS),
            connect_secs: parse_or(lookup("PINTEREST_CONNECT_TIMEOUT_SECS"), DEFAULT_CONNECT_TIMEOUT_SECS),
        };
        let max_concurrent_pins = parse_or(lookup("PINTEREST_MAX_CONCURRENT_PINS"), DEFAULT_MAX_CONCURRENT_PINS);
        if max_concurrent_pins == 0 {
            return Err(ConfigError::Parse("PINTEREST_MAX_CONCURRENT_PINS must be at least 1".into()));
        }

        Ok(Self { access_token, api_base_url, board_cache_path, timeouts, max_concurrent_pins })
    }
}

fn parse_or<T>(raw: Option<String>, default: T) -> T
where
    T: std::str::FromStr,
{
    raw.and_then(|v| v.trim().parse::<T>().ok()).unwrap_or(default)
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
