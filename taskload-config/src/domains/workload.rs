//! Workload mix configuration
//!
//! Describes how a virtual user spreads its iterations across operations,
//! how often it polls the health endpoint, how it paces itself and how many
//! task ids it keeps in its working set.

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_probability, Validatable};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Operation names accepted in the mix
pub const PRIMARY_OPERATIONS: &[&str] = &["list", "create", "read_by_id", "update", "delete"];

/// Tolerance used when checking that the mix weights sum to 1
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Workload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkloadConfig {
    /// Ordered operation mix; weights must sum to 1
    #[serde(default = "default_mix")]
    pub mix: Vec<MixEntryConfig>,

    /// Probability of an extra health check per iteration
    #[serde(default = "default_health_check_probability")]
    pub health_check_probability: f64,

    /// Delay between two iterations of the same virtual user
    #[serde(
        rename = "pacing_ms",
        with = "crate::domains::utils::serde_duration_millis",
        default = "default_pacing"
    )]
    pub pacing: Duration,

    /// Working-set limits
    #[serde(default)]
    pub pool: PoolConfig,
}

/// One entry of the operation mix
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixEntryConfig {
    pub operation: String,
    pub weight: f64,
}

/// Entity id pool limits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolConfig {
    /// Ids taken from a list response
    pub seed_cap: usize,

    /// Ids retained after a create
    pub retain_cap: usize,

    /// Pool size at or below which deletes are skipped
    pub delete_floor: usize,
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        Self {
            mix: default_mix(),
            health_check_probability: default_health_check_probability(),
            pacing: default_pacing(),
            pool: PoolConfig::default(),
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            seed_cap: 10,
            retain_cap: 20,
            delete_floor: 5,
        }
    }
}

impl MixEntryConfig {
    pub fn new(operation: impl Into<String>, weight: f64) -> Self {
        Self {
            operation: operation.into(),
            weight,
        }
    }
}

impl Validatable for WorkloadConfig {
    fn validate(&self) -> ConfigResult<()> {
        if self.mix.is_empty() {
            return Err(self.validation_error("mix must contain at least one operation"));
        }

        let mut seen: Vec<&str> = Vec::with_capacity(self.mix.len());
        for entry in &self.mix {
            if !PRIMARY_OPERATIONS.contains(&entry.operation.as_str()) {
                return Err(self.validation_error(format!(
                    "mix has invalid operation '{}'. Valid choices: {}",
                    entry.operation,
                    PRIMARY_OPERATIONS.join(", ")
                )));
            }
            if seen.contains(&entry.operation.as_str()) {
                return Err(self.validation_error(format!(
                    "operation '{}' appears more than once in mix",
                    entry.operation
                )));
            }
            seen.push(&entry.operation);

            if !(entry.weight > 0.0 && entry.weight.is_finite()) {
                return Err(self.validation_error(format!(
                    "weight for '{}' must be greater than 0, got {}",
                    entry.operation, entry.weight
                )));
            }
        }

        let total: f64 = self.mix.iter().map(|e| e.weight).sum();
        if (total - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(self.validation_error(format!(
                "mix weights must sum to 1, got {}",
                total
            )));
        }

        validate_probability(
            self.health_check_probability,
            "health_check_probability",
            self.domain_name(),
        )?;

        self.pool.validate()?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "workload"
    }
}

impl Validatable for PoolConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(self.seed_cap, "seed_cap", self.domain_name())?;
        validate_positive(self.retain_cap, "retain_cap", self.domain_name())?;

        if self.seed_cap > self.retain_cap {
            return Err(self.validation_error(format!(
                "seed_cap ({}) cannot exceed retain_cap ({})",
                self.seed_cap, self.retain_cap
            )));
        }

        if self.delete_floor >= self.retain_cap {
            return Err(self.validation_error(format!(
                "delete_floor ({}) must be below retain_cap ({})",
                self.delete_floor, self.retain_cap
            )));
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "workload.pool"
    }
}

// Default value functions
fn default_mix() -> Vec<MixEntryConfig> {
    vec![
        MixEntryConfig::new("list", 0.4),
        MixEntryConfig::new("create", 0.2),
        MixEntryConfig::new("read_by_id", 0.2),
        MixEntryConfig::new("update", 0.1),
        MixEntryConfig::new("delete", 0.1),
    ]
}

fn default_health_check_probability() -> f64 {
    0.1
}

fn default_pacing() -> Duration {
    Duration::from_secs(1)
}
