//! Domain-specific configuration modules

pub mod http;
pub mod logging;
pub mod ramp;
pub mod target;
pub mod thresholds;
pub mod utils;
pub mod workload;

use crate::error::ConfigResult;
use crate::validation::Validatable;
use serde::{Deserialize, Serialize};

/// Main taskload configuration combining all domains
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct TaskloadConfig {
    /// Service under test
    #[serde(default)]
    pub target: target::TargetConfig,

    /// HTTP client configuration
    #[serde(default)]
    pub http: http::HttpConfig,

    /// Virtual-user workload
    #[serde(default)]
    pub workload: workload::WorkloadConfig,

    /// Ramp stages
    #[serde(default)]
    pub ramp: ramp::RampConfig,

    /// End-of-run thresholds
    #[serde(default)]
    pub thresholds: thresholds::ThresholdsConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: logging::LoggingConfig,
}

impl TaskloadConfig {
    /// Validate all domain configurations
    pub fn validate_all(&self) -> ConfigResult<()> {
        self.target.validate()?;
        self.http.validate()?;
        self.workload.validate()?;
        self.ramp.validate()?;
        self.thresholds.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Generate a sample configuration file
    pub fn generate_sample() -> String {
        let config = TaskloadConfig::default();
        serde_yaml::to_string(&config)
            .unwrap_or_else(|_| "# Failed to generate sample config".to_string())
    }
}
