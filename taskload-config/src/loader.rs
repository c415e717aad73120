//! Configuration loading and environment variable handling

use crate::domains::TaskloadConfig;
use crate::error::{ConfigError, ConfigResult};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

/// Configuration loader with environment variable support
pub struct ConfigLoader {
    /// Environment variable prefix
    prefix: String,
}

impl ConfigLoader {
    /// Create a new config loader with default prefix
    pub fn new() -> Self {
        Self {
            prefix: "TASKLOAD".to_string(),
        }
    }

    /// Create a new config loader with custom prefix
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Load configuration from a YAML file with environment overrides
    pub fn from_file(&self, path: impl AsRef<Path>) -> ConfigResult<TaskloadConfig> {
        let path = path.as_ref();
        debug!("Loading configuration from {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let mut config: TaskloadConfig = serde_yaml::from_str(&content)?;

        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env(&self) -> ConfigResult<TaskloadConfig> {
        let mut config = TaskloadConfig::default();
        self.apply_env_overrides(&mut config)?;
        config.validate_all()?;
        Ok(config)
    }

    /// Load configuration with fallback chain
    pub fn load(&self, config_path: Option<impl AsRef<Path>>) -> ConfigResult<TaskloadConfig> {
        match config_path {
            Some(path) => self.from_file(path),
            None => self.from_env(),
        }
    }

    /// Apply environment variable overrides to configuration
    fn apply_env_overrides(&self, config: &mut TaskloadConfig) -> ConfigResult<()> {
        self.apply_target_overrides(&mut config.target)?;
        self.apply_http_overrides(&mut config.http)?;
        self.apply_workload_overrides(&mut config.workload)?;
        self.apply_logging_overrides(&mut config.logging)?;
        Ok(())
    }

    fn apply_target_overrides(
        &self,
        config: &mut crate::domains::target::TargetConfig,
    ) -> ConfigResult<()> {
        if let Ok(host) = self.get_env_var("TARGET_HOST") {
            config.base_url = host;
        }

        Ok(())
    }

    fn apply_http_overrides(
        &self,
        config: &mut crate::domains::http::HttpConfig,
    ) -> ConfigResult<()> {
        if let Ok(timeout) = self.get_env_var("HTTP_TIMEOUT") {
            let seconds: u64 = self.parse_env("HTTP_TIMEOUT", &timeout)?;
            config.timeout = Duration::from_secs(seconds);
        }

        if let Ok(user_agent) = self.get_env_var("HTTP_USER_AGENT") {
            config.user_agent = user_agent;
        }

        if let Ok(verify_ssl) = self.get_env_var("HTTP_VERIFY_SSL") {
            config.verify_ssl = self.parse_env("HTTP_VERIFY_SSL", &verify_ssl)?;
        }

        Ok(())
    }

    fn apply_workload_overrides(
        &self,
        config: &mut crate::domains::workload::WorkloadConfig,
    ) -> ConfigResult<()> {
        if let Ok(probability) = self.get_env_var("HEALTH_CHECK_PROBABILITY") {
            config.health_check_probability =
                self.parse_env("HEALTH_CHECK_PROBABILITY", &probability)?;
        }

        if let Ok(pacing) = self.get_env_var("PACING_MS") {
            let millis: u64 = self.parse_env("PACING_MS", &pacing)?;
            config.pacing = Duration::from_millis(millis);
        }

        Ok(())
    }

    fn apply_logging_overrides(
        &self,
        config: &mut crate::domains::logging::LoggingConfig,
    ) -> ConfigResult<()> {
        if let Ok(log_level) = self.get_env_var("LOG_LEVEL") {
            config.level = crate::domains::logging::LogLevel::from_str(&log_level)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_LEVEL: {}", log_level)))?;
        }

        if let Ok(format) = self.get_env_var("LOG_FORMAT") {
            config.format = crate::domains::logging::LogFormat::from_str(&format)
                .map_err(|_| ConfigError::EnvError(format!("Invalid LOG_FORMAT: {}", format)))?;
        }

        Ok(())
    }

    fn parse_env<T>(&self, name: &str, value: &str) -> ConfigResult<T>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        value
            .parse()
            .map_err(|e| ConfigError::EnvError(format!("Invalid {}: {}", name, e)))
    }

    /// Get environment variable with prefix
    fn get_env_var(&self, name: &str) -> Result<String, std::env::VarError> {
        std::env::var(format!("{}_{}", self.prefix, name))
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
