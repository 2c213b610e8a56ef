//! Configuration infrastructure
//!
//! Settings are read from an optional JSON file and overlaid with
//! `COIN_SEARCH__<SECTION>__<KEY>` environment variables, e.g.
//! `COIN_SEARCH__SEARCH__MAX_CONCURRENT_TASKS=4`.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::info;

use crate::domain::{MAX_TITLES_PER_SITE, Site};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load config: {source}")]
    Load {
        #[from]
        source: config::ConfigError,
    },

    #[error("Configuration validation failed: {message}")]
    Validation { message: String },
}

/// Complete application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub search: SearchConfig,
    pub http: HttpConfig,
    pub pacing: PacingConfig,
    pub logging: LoggingConfig,
    pub output: OutputConfig,
}

/// Fan-out settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Maximum search tasks (varieties) processed at the same time
    pub max_concurrent_tasks: usize,

    /// Listing titles kept per site and variety
    pub titles_per_site: usize,

    /// Sites searched when none are given on the command line
    pub default_sites: Vec<Site>,
}

/// Outbound HTTP settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub user_agent: String,

    /// Total time allowed for one request; 0 disables the limit
    pub request_timeout_seconds: u64,

    pub follow_redirects: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PacingStrategy {
    /// Sleep a fixed delay after every request
    Fixed,
    /// Shared per-site limiter enforcing a minimum interval between requests
    PerSite,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub strategy: PacingStrategy,

    /// Delay (fixed) or minimum interval (per site) in milliseconds
    pub delay_ms: u64,
}

/// Logging configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    pub level: String,

    /// Enable JSON formatted logs
    pub json_format: bool,

    pub console_output: bool,

    pub file_output: bool,

    /// Directory for log files; defaults to `logs/` next to the executable
    pub log_dir: Option<PathBuf>,

    /// "daily" or "never"
    pub rotation: String,

    /// Module-specific log level filters (e.g., "reqwest": "info")
    pub module_filters: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub default_file_name: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_tasks: defaults::MAX_CONCURRENT_TASKS,
            titles_per_site: MAX_TITLES_PER_SITE,
            default_sites: Site::default_selection(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::USER_AGENT.to_string(),
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            follow_redirects: true,
        }
    }
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            strategy: PacingStrategy::Fixed,
            delay_ms: defaults::PACING_DELAY_MS,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::LOG_LEVEL.to_string(),
            json_format: false,
            console_output: true,
            file_output: false,
            log_dir: None,
            rotation: "daily".to_string(),
            module_filters: {
                let mut filters = HashMap::new();
                filters.insert("reqwest".to_string(), "info".to_string());
                filters.insert("hyper".to_string(), "warn".to_string());
                filters.insert("h2".to_string(), "warn".to_string());
                filters.insert("html5ever".to_string(), "warn".to_string());
                filters.insert("selectors".to_string(), "warn".to_string());
                filters
            },
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_file_name: defaults::OUTPUT_FILE_NAME.to_string(),
        }
    }
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search.max_concurrent_tasks == 0 {
            return Err(ConfigError::Validation {
                message: "search.max_concurrent_tasks must be greater than 0".to_string(),
            });
        }
        if !(1..=MAX_TITLES_PER_SITE).contains(&self.search.titles_per_site) {
            return Err(ConfigError::Validation {
                message: format!("search.titles_per_site must be between 1 and {MAX_TITLES_PER_SITE}"),
            });
        }
        if self.http.user_agent.trim().is_empty() {
            return Err(ConfigError::Validation {
                message: "http.user_agent must not be empty".to_string(),
            });
        }
        if self.pacing.strategy == PacingStrategy::PerSite && self.pacing.delay_ms == 0 {
            return Err(ConfigError::Validation {
                message: "pacing.delay_ms must be greater than 0 for the per_site strategy".to_string(),
            });
        }
        Ok(())
    }
}

/// Configuration manager for loading and saving settings
pub struct ConfigManager {
    pub config_path: PathBuf,
}

impl ConfigManager {
    /// Get the application configuration directory
    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Failed to get user config directory")?
            .join("coin-search");
        Ok(config_dir)
    }

    /// Manager for the default location, `<config dir>/coin-search/config.json`
    pub fn new() -> Result<Self> {
        Ok(Self {
            config_path: Self::get_config_dir()?.join("config.json"),
        })
    }

    pub fn with_path(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
        }
    }

    /// Load the file (if present) plus environment overrides.
    ///
    /// Not validated here: callers apply their own overrides first and then
    /// call [`AppConfig::validate`].
    pub fn load_config(&self) -> Result<AppConfig, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from(self.config_path.as_path()).required(false))
            .add_source(
                config::Environment::with_prefix("COIN_SEARCH")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Save configuration to file
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create config directory: {parent:?}"))?;
        }

        let content = serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;
        fs::write(&self.config_path, content)
            .await
            .with_context(|| format!("Failed to write configuration file: {:?}", self.config_path))?;

        info!("Configuration saved to: {:?}", self.config_path);
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

/// Default values
pub mod defaults {
    /// Default maximum concurrent search tasks
    pub const MAX_CONCURRENT_TASKS: usize = 10;

    /// Default delay after each site request in milliseconds
    pub const PACING_DELAY_MS: u64 = 1500;

    /// Default request timeout in seconds
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 20;

    pub const USER_AGENT: &str = "Mozilla/5.0";

    pub const LOG_LEVEL: &str = "info";

    pub const OUTPUT_FILE_NAME: &str = "coin_search_results.csv";
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.search.max_concurrent_tasks, 10);
        assert_eq!(config.pacing.delay_ms, 1500);
        assert_eq!(config.search.default_sites, vec![Site::Ebay, Site::HeritageAuctions]);
    }

    #[test]
    fn test_validation_rejects_zero_concurrency() {
        let mut config = AppConfig::default();
        config.search.max_concurrent_tasks = 0;
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[test]
    fn test_validation_rejects_title_limit_above_five() {
        let mut config = AppConfig::default();
        config.search.titles_per_site = 6;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("absent.json"));
        let config = manager.load_config().unwrap();
        assert_eq!(config.output.default_file_name, "coin_search_results.csv");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{ "search": { "max_concurrent_tasks": 4, "default_sites": ["VCoins"] },
                 "pacing": { "strategy": "per_site", "delay_ms": 250 } }"#,
        )
        .unwrap();

        let config = ConfigManager::with_path(&path).load_config().unwrap();
        assert_eq!(config.search.max_concurrent_tasks, 4);
        assert_eq!(config.search.titles_per_site, 5);
        assert_eq!(config.search.default_sites, vec![Site::VCoins]);
        assert_eq!(config.pacing.strategy, PacingStrategy::PerSite);
        assert_eq!(config.http.user_agent, "Mozilla/5.0");
    }

    #[test]
    fn test_loading_does_not_validate() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "pacing": { "strategy": "per_site", "delay_ms": 0 } }"#).unwrap();

        let config = ConfigManager::with_path(&path).load_config().unwrap();
        assert_eq!(config.pacing.delay_ms, 0);
        assert!(matches!(config.validate(), Err(ConfigError::Validation { .. })));
    }

    #[tokio::test]
    async fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("nested").join("config.json"));
        let mut config = AppConfig::default();
        config.pacing.delay_ms = 42;

        manager.save_config(&config).await.unwrap();
        let loaded = manager.load_config().unwrap();
        assert_eq!(loaded.pacing.delay_ms, 42);
    }
}
