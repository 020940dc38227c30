use crate::client::connection::MonitorConfig;
use crate::client::offline::FileBackend;
use crate::shared::config::{AppConfig, ConfigError};
use std::path::PathBuf;

/// Env var overriding the server URL
pub const ENV_API_URL: &str = "STUDYMATE_API_URL";
/// Env var naming a TOML config file
pub const ENV_CONFIG_PATH: &str = "STUDYMATE_CONFIG";
/// Env var overriding the storage directory
pub const ENV_DATA_DIR: &str = "STUDYMATE_DATA_DIR";

/// Client configuration: `AppConfig` plus environment overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    app: AppConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app: AppConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_app_config(app: AppConfig) -> Result<Self, ConfigError> {
        app.validate()?;
        Ok(Self { app })
    }

    /// Build from the environment.
    ///
    /// Starts from the file named by `STUDYMATE_CONFIG` (or defaults), then
    /// applies `STUDYMATE_API_URL` and `STUDYMATE_DATA_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut app = match std::env::var(ENV_CONFIG_PATH) {
            Ok(path) => AppConfig::load(path)?,
            Err(_) => AppConfig::default(),
        };
        if let Ok(url) = std::env::var(ENV_API_URL) {
            app.server_url = url;
        }
        if let Ok(dir) = std::env::var(ENV_DATA_DIR) {
            app.storage_dir = Some(PathBuf::from(dir));
        }
        Self::with_app_config(app)
    }

    pub fn app(&self) -> &AppConfig {
        &self.app
    }

    /// Get the full URL for an API endpoint
    pub fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.server_url(), path)
    }

    pub fn server_url(&self) -> &str {
        self.app.server_url.trim_end_matches('/')
    }

    pub fn health_url(&self) -> String {
        self.app.health_url()
    }

    pub fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig::from(&self.app)
    }

    /// Directory for file-backed storage
    pub fn storage_dir(&self) -> PathBuf {
        self.app
            .storage_dir
            .clone()
            .unwrap_or_else(FileBackend::default_root)
    }

    pub fn storage_prefix(&self) -> &str {
        &self.app.storage_prefix
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::time::Duration;

    fn clear_env() {
        std::env::remove_var(ENV_API_URL);
        std::env::remove_var(ENV_CONFIG_PATH);
        std::env::remove_var(ENV_DATA_DIR);
    }

    #[test]
    fn test_config_new() {
        let config = Config::new();
        assert_eq!(config.server_url(), "http://127.0.0.1:5000");
        assert_eq!(config.health_url(), "http://127.0.0.1:5000/api/health");
    }

    #[test]
    fn test_api_url() {
        let config = Config::new();
        let url = config.api_url("/api/tasks");
        assert_eq!(url, "http://127.0.0.1:5000/api/tasks");
    }

    #[test]
    fn test_monitor_config_mirrors_app_config() {
        let app = AppConfig::builder()
            .probe_timeout_ms(250)
            .check_interval_ms(1_000)
            .max_retries(3)
            .build()
            .unwrap();
        let monitor = Config::with_app_config(app).unwrap().monitor_config();
        assert_eq!(monitor.probe_timeout, Duration::from_millis(250));
        assert_eq!(monitor.check_interval, Duration::from_secs(1));
        assert_eq!(monitor.max_retries, 3);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        clear_env();
        std::env::set_var(ENV_API_URL, "https://studymate.example.com/");
        std::env::set_var(ENV_DATA_DIR, "/tmp/studymate-test");

        let config = Config::from_env().unwrap();
        assert_eq!(config.server_url(), "https://studymate.example.com");
        assert_eq!(config.storage_dir(), PathBuf::from("/tmp/studymate-test"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_config_file() {
        clear_env();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("studymate.toml");
        std::fs::write(&path, "server_url = \"http://10.0.0.2:8080\"\nmax_retries = 2\n").unwrap();
        std::env::set_var(ENV_CONFIG_PATH, &path);

        let config = Config::from_env().unwrap();
        assert_eq!(config.server_url(), "http://10.0.0.2:8080");
        assert_eq!(config.app().max_retries, 2);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_env_invalid_url_is_rejected() {
        clear_env();
        std::env::set_var(ENV_API_URL, "::not-a-url::");
        assert!(matches!(Config::from_env(), Err(ConfigError::InvalidUrl(_))));
        clear_env();
    }
}
