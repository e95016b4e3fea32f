//! Configuration loader with inheritance support.
//!
//! Loads configuration from multiple sources and merges them:
//! 1. Global config: `~/.castview/config.toml`
//! 2. Local config: `.castview/config.toml` (in the profile directory)
//! 3. Programmatic overrides
//!
//! Later sources override earlier ones.

use crate::error::ConfigError;
use crate::{ApiConfig, CastviewConfig, ConfigOverrides, LoggingConfig, QueryConfig};
use std::path::{Path, PathBuf};
use tracing::{debug, trace};

/// Configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Global configuration directory name.
const GLOBAL_CONFIG_DIR: &str = ".castview";

/// Local configuration directory name.
const LOCAL_CONFIG_DIR: &str = ".castview";

/// Configuration loader with caching and inheritance support.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Global config directory (e.g., `~/.castview`)
    global_config_dir: Option<PathBuf>,

    /// Cached global config
    global_config: Option<CastviewConfig>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader.
    ///
    /// Automatically detects the global config directory (`~/.castview`).
    pub fn new() -> Self {
        let global_config_dir = dirs::home_dir().map(|h| h.join(GLOBAL_CONFIG_DIR));

        Self {
            global_config_dir,
            global_config: None,
        }
    }

    /// Create a loader with a custom global config directory.
    ///
    /// Useful for testing.
    pub fn with_global_dir(global_dir: impl Into<PathBuf>) -> Self {
        Self {
            global_config_dir: Some(global_dir.into()),
            global_config: None,
        }
    }

    /// Get the global config file path.
    pub fn global_config_path(&self) -> Option<PathBuf> {
        self.global_config_dir
            .as_ref()
            .map(|d| d.join(CONFIG_FILE_NAME))
    }

    /// Get the local config file path for a profile directory.
    pub fn local_config_path(&self, profile_root: &Path) -> PathBuf {
        profile_root.join(LOCAL_CONFIG_DIR).join(CONFIG_FILE_NAME)
    }

    /// Load configuration for a profile directory with optional overrides.
    ///
    /// Merges config in order: global → local → overrides.
    pub fn load(
        &mut self,
        profile_root: &Path,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<CastviewConfig, ConfigError> {
        // Start with default config
        let mut config = CastviewConfig::default();

        // Apply global config if available
        if let Some(global_config) = self.load_global()? {
            config = merge_configs(config, global_config);
        }

        // Apply local config if available
        if let Some(local_config) = self.load_local(profile_root)? {
            config = merge_configs(config, local_config);
        }

        // Apply overrides
        if let Some(ovr) = overrides {
            config.apply_overrides(ovr);
        }

        Ok(config)
    }

    /// Load only the global configuration.
    pub fn load_global(&mut self) -> Result<Option<CastviewConfig>, ConfigError> {
        // Return cached global config if available
        if let Some(ref config) = self.global_config {
            return Ok(Some(config.clone()));
        }

        let Some(global_path) = self.global_config_path() else {
            debug!("No home directory found, skipping global config");
            return Ok(None);
        };

        if !global_path.exists() {
            trace!("Global config not found at {:?}", global_path);
            return Ok(None);
        }

        debug!("Loading global config from {:?}", global_path);
        let config = load_config_file(&global_path)?;

        // Cache the global config
        self.global_config = Some(config.clone());

        Ok(Some(config))
    }

    /// Load only the local configuration for a profile directory.
    pub fn load_local(&self, profile_root: &Path) -> Result<Option<CastviewConfig>, ConfigError> {
        let local_path = self.local_config_path(profile_root);

        if !local_path.exists() {
            trace!("Local config not found at {:?}", local_path);
            return Ok(None);
        }

        debug!("Loading local config from {:?}", local_path);
        load_config_file(&local_path).map(Some)
    }

    /// Clear cached global configuration.
    ///
    /// Forces reload on next `load_global()` call.
    pub fn clear_cache(&mut self) {
        self.global_config = None;
    }
}

/// Load a configuration file from disk.
fn load_config_file(path: &Path) -> Result<CastviewConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;

    toml::from_str(&content).map_err(|e| ConfigError::parse_toml(path, e))
}

/// Merge two configurations, with `overlay` taking precedence.
///
/// This performs a field-by-field merge, allowing partial configs.
fn merge_configs(base: CastviewConfig, overlay: CastviewConfig) -> CastviewConfig {
    CastviewConfig {
        api: merge_api(base.api, overlay.api),
        query: merge_query(base.query, overlay.query),
        logging: merge_logging(base.logging, overlay.logging),
    }
}

/// Merge API config, overlay values override base.
fn merge_api(base: ApiConfig, overlay: ApiConfig) -> ApiConfig {
    let default = ApiConfig::default();
    ApiConfig {
        // Use overlay if it differs from default, otherwise keep base
        base_url: if overlay.base_url != default.base_url {
            overlay.base_url
        } else {
            base.base_url
        },
        client_id: overlay.client_id.or(base.client_id),
        timeout_secs: if overlay.timeout_secs != default.timeout_secs {
            overlay.timeout_secs
        } else {
            base.timeout_secs
        },
    }
}

/// Merge query config, overlay values override base.
fn merge_query(base: QueryConfig, overlay: QueryConfig) -> QueryConfig {
    let default = QueryConfig::default();
    QueryConfig {
        default_limit: if overlay.default_limit != default.default_limit {
            overlay.default_limit
        } else {
            base.default_limit
        },
        max_limit: if overlay.max_limit != default.max_limit {
            overlay.max_limit
        } else {
            base.max_limit
        },
    }
}

/// Merge logging config, overlay values override base.
fn merge_logging(base: LoggingConfig, overlay: LoggingConfig) -> LoggingConfig {
    let default = LoggingConfig::default();
    LoggingConfig {
        level: if overlay.level != default.level {
            overlay.level
        } else {
            base.level
        },
    }
}
