//! Application configuration module
//!
//! `AppConfig` holds every tunable of the connection monitor and the local
//! store. It can be built in code through [`AppConfigBuilder`] or loaded
//! from a TOML file; both paths end in [`AppConfig::validate`].
//!
//! ```toml
//! server_url = "https://studymate.example.com"
//! health_path = "/api/health"
//! probe_timeout_ms = 5000
//! check_interval_ms = 30000
//! max_retries = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default server URL
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
/// Default health endpoint path
pub const DEFAULT_HEALTH_PATH: &str = "/api/health";
/// Default per-probe deadline
pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 5_000;
/// Default period of the background probe
pub const DEFAULT_CHECK_INTERVAL_MS: u64 = 30_000;
/// Default retry ceiling
pub const DEFAULT_MAX_RETRIES: u32 = 5;
/// Default first backoff step
pub const DEFAULT_BACKOFF_BASE_MS: u64 = 1_000;
/// Default backoff cap
pub const DEFAULT_BACKOFF_MAX_MS: u64 = 30_000;
/// Default namespace for storage keys
pub const DEFAULT_STORAGE_PREFIX: &str = "studymate_";

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Server URL
    pub server_url: String,
    /// Path of the health endpoint, appended to `server_url`
    pub health_path: String,
    /// Hard deadline for a single probe
    pub probe_timeout_ms: u64,
    /// Period of the background probe
    pub check_interval_ms: u64,
    /// Consecutive failures after which the retry counter saturates
    pub max_retries: u32,
    /// First backoff step
    pub backoff_base_ms: u64,
    /// Backoff cap before jitter
    pub backoff_max_ms: u64,
    /// Namespace prepended to every storage key
    pub storage_prefix: String,
    /// Directory for file-backed storage; platform data dir when unset
    pub storage_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_url: DEFAULT_SERVER_URL.to_string(),
            health_path: DEFAULT_HEALTH_PATH.to_string(),
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            check_interval_ms: DEFAULT_CHECK_INTERVAL_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_base_ms: DEFAULT_BACKOFF_BASE_MS,
            backoff_max_ms: DEFAULT_BACKOFF_MAX_MS,
            storage_prefix: DEFAULT_STORAGE_PREFIX.to_string(),
            storage_dir: None,
        }
    }
}

impl AppConfig {
    /// Create a new AppConfigBuilder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Parse and validate a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: AppConfig =
            toml::from_str(source).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&source)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.server_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("{}: {}", self.server_url, e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(format!(
                "{}: scheme must be http or https",
                self.server_url
            )));
        }
        if !self.health_path.starts_with('/') {
            return Err(ConfigError::InvalidValue {
                field: "health_path",
                message: "must start with '/'".to_string(),
            });
        }
        if self.probe_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "probe_timeout_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.check_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "check_interval_ms",
                message: "must be greater than zero".to_string(),
            });
        }
        if self.max_retries == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_retries",
                message: "must be at least 1".to_string(),
            });
        }
        if self.backoff_base_ms > self.backoff_max_ms {
            return Err(ConfigError::InvalidValue {
                field: "backoff_base_ms",
                message: format!("must not exceed backoff_max_ms ({})", self.backoff_max_ms),
            });
        }
        if self.storage_prefix.is_empty() {
            return Err(ConfigError::MissingValue("storage_prefix"));
        }
        Ok(())
    }

    /// Full URL of the health endpoint
    pub fn health_url(&self) -> String {
        format!("{}{}", self.server_url.trim_end_matches('/'), self.health_path)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    /// Set the server URL
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into();
        self
    }

    pub fn health_path(mut self, path: impl Into<String>) -> Self {
        self.config.health_path = path.into();
        self
    }

    pub fn probe_timeout_ms(mut self, ms: u64) -> Self {
        self.config.probe_timeout_ms = ms;
        self
    }

    pub fn check_interval_ms(mut self, ms: u64) -> Self {
        self.config.check_interval_ms = ms;
        self
    }

    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config.max_retries = retries;
        self
    }

    pub fn backoff(mut self, base_ms: u64, max_ms: u64) -> Self {
        self.config.backoff_base_ms = base_ms;
        self.config.backoff_max_ms = max_ms;
        self
    }

    pub fn storage_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.storage_prefix = prefix.into();
        self
    }

    pub fn storage_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.storage_dir = Some(dir.into());
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

/// Configuration errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("missing value: {0}")]
    MissingValue(&'static str),
    #[error("invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
    #[error("failed to parse config: {0}")]
    Parse(String),
    #[error("failed to read {path}: {message}")]
    Io { path: PathBuf, message: String },
}
