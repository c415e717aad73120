//! Ramp-stage configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ramp configuration consumed by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RampConfig {
    /// Ordered stages; each ramps linearly from the previous target
    #[serde(default = "default_stages")]
    pub stages: Vec<StageConfig>,

    /// How often the scheduler re-evaluates the virtual-user count
    #[serde(
        rename = "tick_ms",
        with = "crate::domains::utils::serde_duration_millis",
        default = "default_tick"
    )]
    pub tick: Duration,
}

/// A single ramp stage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageConfig {
    /// Stage length
    #[serde(with = "crate::domains::utils::serde_duration")]
    pub duration: Duration,

    /// Virtual users at the end of the stage
    pub target: usize,
}

impl Default for RampConfig {
    fn default() -> Self {
        Self {
            stages: default_stages(),
            tick: default_tick(),
        }
    }
}

impl StageConfig {
    pub fn new(duration: Duration, target: usize) -> Self {
        Self { duration, target }
    }
}

impl RampConfig {
    /// Jump to `vus` users and hold them for `duration`
    pub fn constant(vus: usize, duration: Duration) -> Self {
        Self {
            stages: vec![
                StageConfig::new(Duration::ZERO, vus),
                StageConfig::new(duration, vus),
            ],
            ..Default::default()
        }
    }

    /// Sum of all stage durations
    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }
}

impl Validatable for RampConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.stages.is_empty() {
            return Err(self.validation_error("at least one stage must be configured"));
        }

        if self.total_duration().is_zero() {
            return Err(self.validation_error("total stage duration must be greater than 0"));
        }

        validate_positive(self.tick.as_millis(), "tick_ms", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "ramp"
    }
}

fn default_stages() -> Vec<StageConfig> {
    vec![
        StageConfig::new(Duration::from_secs(120), 10),
        StageConfig::new(Duration::from_secs(300), 10),
        StageConfig::new(Duration::from_secs(120), 20),
        StageConfig::new(Duration::from_secs(300), 20),
        StageConfig::new(Duration::from_secs(120), 0),
    ]
}

fn default_tick() -> Duration {
    Duration::from_secs(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ramp() {
        let ramp = RampConfig::default();
        assert_eq!(ramp.stages.len(), 5);
        assert_eq!(ramp.total_duration(), Duration::from_secs(960));
        assert!(ramp.validate().is_ok());
    }

    #[test]
    fn test_constant_ramp() {
        let ramp = RampConfig::constant(4, Duration::from_secs(30));
        assert_eq!(
            ramp.stages,
            vec![
                StageConfig::new(Duration::ZERO, 4),
                StageConfig::new(Duration::from_secs(30), 4),
            ]
        );
        assert_eq!(ramp.total_duration(), Duration::from_secs(30));
        assert!(ramp.validate().is_ok());
    }

    #[test]
    fn test_ramp_validation() {
        let mut ramp = RampConfig::default();
        ramp.stages.clear();
        assert!(ramp.validate().is_err());

        ramp = RampConfig::constant(1, Duration::ZERO);
        assert!(ramp.validate().is_err());

        ramp = RampConfig::default();
        ramp.tick = Duration::ZERO;
        assert!(ramp.validate().is_err());
    }
}
