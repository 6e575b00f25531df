//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::client::{CubeConfig, API_VERSION};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub cube: CubeSection,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cube deployment configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CubeSection {
    #[serde(default = "default_hostname")]
    pub hostname: String,

    #[serde(default = "default_collector_port")]
    pub collector_port: u16,

    #[serde(default = "default_evaluator_port")]
    pub evaluator_port: u16,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

fn default_hostname() -> String {
    "localhost".to_string()
}

fn default_collector_port() -> u16 {
    1080
}

fn default_evaluator_port() -> u16 {
    1081
}

fn default_api_version() -> String {
    API_VERSION.to_string()
}

fn default_request_timeout() -> u64 {
    5000 // 5 seconds
}

impl Default for CubeSection {
    fn default() -> Self {
        Self {
            hostname: default_hostname(),
            collector_port: default_collector_port(),
            evaluator_port: default_evaluator_port(),
            api_version: default_api_version(),
            request_timeout_ms: default_request_timeout(),
        }
    }
}

impl From<&CubeSection> for CubeConfig {
    fn from(section: &CubeSection) -> Self {
        CubeConfig {
            hostname: section.hostname.clone(),
            collector_port: section.collector_port,
            evaluator_port: section.evaluator_port,
            api_version: section.api_version.clone(),
            request_timeout_ms: section.request_timeout_ms,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("cube").join("config.toml")),
            Some(PathBuf::from("/etc/cube/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::debug!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Settings for [`crate::client::CubeClient::new`]
    pub fn client_config(&self) -> CubeConfig {
        CubeConfig::from(&self.cube)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    /// Apply overrides from a `CUBE_*` variable lookup
    ///
    /// Unparseable port values are ignored.
    pub fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        // Cube overrides
        if let Some(hostname) = lookup("CUBE_HOSTNAME") {
            self.cube.hostname = hostname;
        }
        if let Some(port) = lookup("CUBE_COLLECTOR_PORT") {
            if let Ok(p) = port.parse() {
                self.cube.collector_port = p;
            }
        }
        if let Some(port) = lookup("CUBE_EVALUATOR_PORT") {
            if let Ok(p) = port.parse() {
                self.cube.evaluator_port = p;
            }
        }

        // Logging overrides
        if let Some(level) = lookup("CUBE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("CUBE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Cube Client Configuration
#
# Environment variables override these settings:
# - CUBE_HOSTNAME
# - CUBE_COLLECTOR_PORT
# - CUBE_EVALUATOR_PORT
# - CUBE_LOG_LEVEL
# - CUBE_LOG_FORMAT

[cube]
# Host running the collector and evaluator
hostname = "localhost"

# Collector port (event submission)
collector_port = 1080

# Evaluator port (event and metric queries)
evaluator_port = 1081

# API version path segment
api_version = "1.0"

# Request timeout (ms)
request_timeout_ms = 5000

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log format: pretty or json
format = "pretty"
"#
    .to_string()
}
