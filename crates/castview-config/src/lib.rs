//! Castview Configuration Management
//!
//! Provides configuration loading with support for:
//! - Global config: `~/.castview/config.toml`
//! - Local config: `.castview/config.toml` (in the profile directory)
//! - Programmatic overrides via `ConfigOverrides`
//!
//! Configuration is merged in order: global → local → overrides.

mod error;
mod loader;

pub use error::ConfigError;
pub use loader::ConfigLoader;

use serde::{Deserialize, Serialize};

/// Default catalog API base URL.
pub const DEFAULT_API_URL: &str = "https://api.castview.tv/v5";

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default page size for collection queries.
pub const DEFAULT_QUERY_LIMIT: usize = 25;

/// Maximum page size the service accepts.
pub const DEFAULT_QUERY_MAX_LIMIT: usize = 100;

/// Root configuration for Castview.
///
/// Represents the fully merged configuration from all sources.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CastviewConfig {
    /// Catalog API configuration
    pub api: ApiConfig,

    /// Collection query configuration
    pub query: QueryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Catalog API configuration.
///
/// # Example TOML
///
/// ```toml
/// [api]
/// base_url = "https://api.castview.tv/v5"
/// client_id = "abc123"
/// timeout_secs = 30
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the catalog service
    pub base_url: String,

    /// Client identifier sent with every request (service requirement)
    pub client_id: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            client_id: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

/// Collection query configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Default page size for list queries
    pub default_limit: usize,

    /// Maximum page size the service accepts
    pub max_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_limit: DEFAULT_QUERY_LIMIT,
            max_limit: DEFAULT_QUERY_MAX_LIMIT,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level filter ("trace", "debug", "info", "warn", "error")
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Programmatic overrides applied after file-based configuration.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// Override the API base URL
    pub base_url: Option<String>,

    /// Override the client identifier
    pub client_id: Option<String>,

    /// Override the request timeout
    pub timeout_secs: Option<u64>,

    /// Override the default query limit
    pub default_limit: Option<usize>,

    /// Override the log level
    pub log_level: Option<String>,
}

impl CastviewConfig {
    /// Apply overrides to this configuration.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(ref url) = overrides.base_url {
            self.api.base_url = url.clone();
        }

        if let Some(ref client_id) = overrides.client_id {
            self.api.client_id = Some(client_id.clone());
        }

        if let Some(timeout) = overrides.timeout_secs {
            self.api.timeout_secs = timeout;
        }

        if let Some(limit) = overrides.default_limit {
            self.query.default_limit = limit;
        }

        if let Some(ref level) = overrides.log_level {
            self.logging.level = level.clone();
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.is_empty() {
            return Err(ConfigError::invalid_value(
                "api.base_url",
                "base URL must not be empty",
            ));
        }

        if self.query.default_limit == 0 {
            return Err(ConfigError::invalid_value(
                "query.default_limit",
                "page size must be at least 1",
            ));
        }

        if self.query.default_limit > self.query.max_limit {
            return Err(ConfigError::invalid_value(
                "query.default_limit",
                format!(
                    "page size exceeds the service maximum of {}",
                    self.query.max_limit
                ),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let config = CastviewConfig::default();

        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.api.client_id, None);
        assert_eq!(config.api.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.query.default_limit, DEFAULT_QUERY_LIMIT);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = CastviewConfig::default();
        let overrides = ConfigOverrides {
            base_url: Some("http://localhost:8000/api".to_string()),
            client_id: Some("test-client".to_string()),
            log_level: Some("debug".to_string()),
            ..Default::default()
        };

        config.apply_overrides(&overrides);

        assert_eq!(config.api.base_url, "http://localhost:8000/api");
        assert_eq!(config.api.client_id, Some("test-client".to_string()));
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_validate_default_passes() {
        assert!(CastviewConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_url() {
        let mut config = CastviewConfig::default();
        config.api.base_url = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_oversized_limit() {
        let mut config = CastviewConfig::default();
        config.query.default_limit = config.query.max_limit + 1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: CastviewConfig = toml::from_str(
            r#"
            [api]
            client_id = "abc123"
            "#,
        )
        .unwrap();

        // Unspecified fields fall back to defaults
        assert_eq!(config.api.client_id, Some("abc123".to_string()));
        assert_eq!(config.api.base_url, DEFAULT_API_URL);
        assert_eq!(config.query.default_limit, DEFAULT_QUERY_LIMIT);
    }
}
