//! Application settings and configuration management

use crate::error::{AppError, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub uploads: UploadConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Upper bound on the recency listing returned by `GET /api/generations`
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_recent_limit() -> usize {
    10
}

/// External generation provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ProviderConfig {
    /// Full URL the generation request is POSTed to
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Optional bearer token sent with each provider call
    #[serde(default)]
    pub api_token: Option<String>,
    /// Hard cap on a single provider call; a timed-out call fails the record
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    "https://api.replicate.com/v1/models/google/nano-banana/predictions".to_string()
}

fn default_provider_timeout() -> u64 {
    300
}

/// Upload limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UploadConfig {
    #[serde(default = "default_max_files")]
    pub max_files: usize,
    #[serde(default = "default_max_file_size")]
    pub max_file_size_bytes: usize,
}

fn default_max_files() -> usize {
    5
}

fn default_max_file_size() -> usize {
    10 * 1024 * 1024
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

impl Settings {
    /// Load settings from configuration files and environment variables
    pub fn load() -> Result<Self> {
        Self::load_from_path("config/default.toml")
    }

    /// Load settings from a specific configuration file path
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "0.0.0.0")?
            .set_default("server.port", 8080)?
            .set_default("server.recent_limit", 10)?
            .set_default("provider.endpoint", default_endpoint())?
            .set_default("provider.timeout_secs", 300)?
            .set_default("uploads.max_files", 5)?
            .set_default("uploads.max_file_size_bytes", 10 * 1024 * 1024)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            // Load from configuration file
            .add_source(File::with_name(path.as_ref().to_str().unwrap_or("config/default")).required(false))
            // Override with environment variables (prefixed with IMG_RELAY_)
            .add_source(
                Environment::with_prefix("IMG_RELAY")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = config.try_deserialize()?;
        Ok(settings)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.server.port == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Server port cannot be 0".to_string(),
            )));
        }

        if self.provider.endpoint.is_empty() {
            return Err(AppError::Config(config::ConfigError::Message(
                "Provider endpoint cannot be empty".to_string(),
            )));
        }

        if self.uploads.max_files == 0 || self.uploads.max_file_size_bytes == 0 {
            return Err(AppError::Config(config::ConfigError::Message(
                "Upload limits must be greater than zero".to_string(),
            )));
        }

        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: default_host(),
                port: default_port(),
                recent_limit: default_recent_limit(),
            },
            provider: ProviderConfig {
                endpoint: default_endpoint(),
                api_token: None,
                timeout_secs: default_provider_timeout(),
            },
            uploads: UploadConfig {
                max_files: default_max_files(),
                max_file_size_bytes: default_max_file_size(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                format: default_log_format(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.server.recent_limit, 10);
        assert_eq!(settings.uploads.max_files, 5);
        assert_eq!(settings.provider.timeout_secs, 300);
    }

    #[test]
    fn test_validate_rejects_zero_port() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_endpoint() {
        let mut settings = Settings::default();
        settings.provider.endpoint.clear();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_upload_limits() {
        let mut settings = Settings::default();
        settings.uploads.max_files = 0;
        assert!(settings.validate().is_err());
    }
}
