//! Pass/fail thresholds evaluated at the end of a run

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_probability, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdsConfig {
    /// Upper bound on the failed-sample rate
    pub max_error_rate: f64,

    /// Upper bound on the failed-request rate
    pub max_http_failure_rate: f64,

    /// Upper bound on the 95th percentile request duration
    #[serde(
        rename = "max_p95_duration_ms",
        with = "crate::domains::utils::serde_duration_millis"
    )]
    pub max_p95_duration: Duration,
}

impl Default for ThresholdsConfig {
    fn default() -> Self {
        Self {
            max_error_rate: 0.05,
            max_http_failure_rate: 0.05,
            max_p95_duration: Duration::from_millis(2000),
        }
    }
}

impl Validatable for ThresholdsConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_probability(self.max_error_rate, "max_error_rate", self.domain_name())?;
        validate_probability(
            self.max_http_failure_rate,
            "max_http_failure_rate",
            self.domain_name(),
        )?;
        validate_positive(
            self.max_p95_duration.as_millis(),
            "max_p95_duration_ms",
            self.domain_name(),
        )?;
        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "thresholds"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_defaults() {
        let config = ThresholdsConfig::default();
        assert_eq!(config.max_error_rate, 0.05);
        assert_eq!(config.max_http_failure_rate, 0.05);
        assert_eq!(config.max_p95_duration, Duration::from_millis(2000));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_threshold_validation() {
        let mut config = ThresholdsConfig::default();
        config.max_error_rate = 2.0;
        assert!(config.validate().is_err());

        config = ThresholdsConfig::default();
        config.max_p95_duration = Duration::ZERO;
        assert!(config.validate().is_err());
    }
}
