//! Client configuration.
//!
//! Values come from the environment; nothing is hardcoded beyond the defaults
//! below.

use std::time::Duration;
use thiserror::Error;

/// Environment variable holding the service base URL
pub const BASE_URL_VAR: &str = "TODO_AI_API_BASE_URL";

/// Environment variable holding the request timeout in seconds
pub const TIMEOUT_VAR: &str = "TODO_AI_API_TIMEOUT_SECS";

/// Environment variable holding the number of todos fetched per load
pub const PAGE_SIZE_VAR: &str = "TODO_AI_PAGE_SIZE";

/// Base URL used when none is configured
pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api/v1";

/// Request timeout used when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Todos fetched per load when not configured
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Invalid client configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Base URL is not an http(s) URL
    #[error("Invalid base URL {0:?}: expected http:// or https://")]
    InvalidBaseUrl(String),

    /// Timeout is zero or not a number
    #[error("Invalid timeout {0:?}: expected a positive number of seconds")]
    InvalidTimeout(String),

    /// Page size is zero or not a number
    #[error("Invalid page size {0:?}: expected a positive integer")]
    InvalidPageSize(String),
}

/// How to reach the todo service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service base URL, without a trailing slash
    ///
    /// Default: `http://localhost:8000/api/v1`
    pub base_url: String,

    /// Per-request timeout
    ///
    /// Default: 30 seconds
    pub timeout: Duration,

    /// `limit` sent when loading the collection
    ///
    /// Default: 100
    pub page_size: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl ClientConfig {
    /// Configuration for a given base URL with default timeout and page size
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::default().with_base_url(base_url)
    }

    /// Reads `TODO_AI_API_BASE_URL`, `TODO_AI_API_TIMEOUT_SECS` and `TODO_AI_PAGE_SIZE`
    ///
    /// Unset variables keep their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`ClientConfig::from_env`], reading variables through `lookup`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base_url) = lookup(BASE_URL_VAR) {
            config = config.with_base_url(base_url);
        }

        if let Some(raw) = lookup(TIMEOUT_VAR) {
            let seconds = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| ConfigError::InvalidTimeout(raw.clone()))?;
            config.timeout = Duration::from_secs(seconds);
        }

        if let Some(raw) = lookup(PAGE_SIZE_VAR) {
            config.page_size = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| ConfigError::InvalidPageSize(raw.clone()))?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Set the base URL; surrounding whitespace and trailing slashes are dropped
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim().trim_end_matches('/').to_string();
        self
    }

    /// Set the request timeout
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the page size used by loads
    #[must_use]
    pub const fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Checks every field
    ///
    /// # Errors
    ///
    /// Returns the first [`ConfigError`] found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let has_host = ["http://", "https://"]
            .iter()
            .filter_map(|scheme| self.base_url.strip_prefix(scheme))
            .any(|rest| !rest.is_empty());
        if !has_host {
            return Err(ConfigError::InvalidBaseUrl(self.base_url.clone()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!("{:?}", self.timeout)));
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidPageSize("0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = ClientConfig::from_lookup(lookup(&[]));
        assert_eq!(config, Ok(ClientConfig::default()));
        assert_eq!(ClientConfig::default().base_url, "http://localhost:8000/api/v1");
        assert_eq!(ClientConfig::default().timeout, Duration::from_secs(30));
    }

    #[test]
    fn reads_every_variable() {
        let config = ClientConfig::from_lookup(lookup(&[
            (BASE_URL_VAR, "https://todo.example.com/api/v1/"),
            (TIMEOUT_VAR, "5"),
            (PAGE_SIZE_VAR, "20"),
        ]));

        assert_eq!(
            config,
            Ok(ClientConfig {
                base_url: "https://todo.example.com/api/v1".to_string(),
                timeout: Duration::from_secs(5),
                page_size: 20,
            })
        );
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(BASE_URL_VAR, "ftp://example.com")])),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert!(matches!(
            ClientConfig::from_lookup(lookup(&[(BASE_URL_VAR, "https://")])),
            Err(ConfigError::InvalidBaseUrl(_))
        ));
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(TIMEOUT_VAR, "0")])),
            Err(ConfigError::InvalidTimeout("0".to_string()))
        );
        assert_eq!(
            ClientConfig::from_lookup(lookup(&[(PAGE_SIZE_VAR, "many")])),
            Err(ConfigError::InvalidPageSize("many".to_string()))
        );
    }

    #[test]
    fn builder_setters() {
        let config = ClientConfig::new("http://127.0.0.1:9000//")
            .with_timeout(Duration::from_secs(2))
            .with_page_size(10);
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.validate(), Ok(()));
        assert!(config.with_timeout(Duration::ZERO).validate().is_err());
    }
}
