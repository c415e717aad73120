//! Weighted scenario selection
//!
//! One uniform draw picks the primary operation through cumulative
//! thresholds; a second, independent draw decides whether a health check
//! rides along in the same iteration.

use crate::error::{DriverError, DriverResult};
use crate::operation::OperationKind;
use rand::Rng;
use taskload_config::{WorkloadConfig, WEIGHT_SUM_TOLERANCE};

/// Probability of an extra health check per iteration
pub const DEFAULT_HEALTH_CHECK_PROBABILITY: f64 = 0.10;

/// Ordered `(upper_bound, operation)` pairs partitioning `[0, 1)`.
///
/// Bounds are strictly increasing and the last one is exactly `1.0`.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkloadMix {
    thresholds: Vec<(f64, OperationKind)>,
}

impl Default for WorkloadMix {
    fn default() -> Self {
        Self {
            thresholds: vec![
                (0.40, OperationKind::List),
                (0.60, OperationKind::Create),
                (0.80, OperationKind::ReadById),
                (0.90, OperationKind::Update),
                (1.00, OperationKind::Delete),
            ],
        }
    }
}

impl WorkloadMix {
    /// Build from cumulative upper bounds
    pub fn from_thresholds(thresholds: Vec<(f64, OperationKind)>) -> DriverResult<Self> {
        if thresholds.is_empty() {
            return Err(DriverError::InvalidMix(
                "at least one operation is required".to_string(),
            ));
        }

        let mut previous = 0.0;
        for (bound, kind) in &thresholds {
            if !kind.is_primary() {
                return Err(DriverError::NotPrimary(kind.to_string()));
            }
            if !bound.is_finite() || *bound <= previous {
                return Err(DriverError::InvalidMix(format!(
                    "bound {} for '{}' must be greater than {}",
                    bound, kind, previous
                )));
            }
            previous = *bound;
        }

        if (previous - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(DriverError::InvalidMix(format!(
                "last bound must be 1, got {}",
                previous
            )));
        }

        let mut thresholds = thresholds;
        if let Some(last) = thresholds.last_mut() {
            last.0 = 1.0;
        }

        Ok(Self { thresholds })
    }

    /// Build from per-operation weights that sum to 1
    pub fn from_weights(weights: &[(OperationKind, f64)]) -> DriverResult<Self> {
        let mut cumulative = 0.0;
        let mut thresholds = Vec::with_capacity(weights.len());
        for (kind, weight) in weights {
            if thresholds.iter().any(|(_, seen)| seen == kind) {
                return Err(DriverError::InvalidMix(format!(
                    "operation '{}' appears more than once",
                    kind
                )));
            }
            if !(*weight > 0.0) {
                return Err(DriverError::InvalidMix(format!(
                    "weight for '{}' must be greater than 0, got {}",
                    kind, weight
                )));
            }
            cumulative += weight;
            thresholds.push((cumulative, *kind));
        }
        Self::from_thresholds(thresholds)
    }

    /// Map `r` in `[0, 1)` to exactly one operation
    pub fn select(&self, r: f64) -> OperationKind {
        for (bound, kind) in &self.thresholds {
            if r < *bound {
                return *kind;
            }
        }
        // r >= 1.0; construction guarantees at least one entry
        self.thresholds[self.thresholds.len() - 1].1
    }

    pub fn thresholds(&self) -> &[(f64, OperationKind)] {
        &self.thresholds
    }

    /// Weight of each operation, in mix order
    pub fn weights(&self) -> Vec<(OperationKind, f64)> {
        let mut previous = 0.0;
        self.thresholds
            .iter()
            .map(|(bound, kind)| {
                let weight = bound - previous;
                previous = *bound;
                (*kind, weight)
            })
            .collect()
    }
}

/// What one iteration will execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub primary: OperationKind,
    pub health_check: bool,
}

/// Stateless selector; every draw is independent
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioSelector {
    mix: WorkloadMix,
    health_check_probability: f64,
}

impl Default for ScenarioSelector {
    fn default() -> Self {
        Self {
            mix: WorkloadMix::default(),
            health_check_probability: DEFAULT_HEALTH_CHECK_PROBABILITY,
        }
    }
}

impl ScenarioSelector {
    pub fn new(mix: WorkloadMix, health_check_probability: f64) -> DriverResult<Self> {
        if !(0.0..=1.0).contains(&health_check_probability) {
            return Err(DriverError::InvalidProbability {
                field: "health_check_probability",
                value: health_check_probability,
            });
        }
        Ok(Self {
            mix,
            health_check_probability,
        })
    }

    pub fn from_config(config: &WorkloadConfig) -> DriverResult<Self> {
        let weights = config
            .mix
            .iter()
            .map(|entry| Ok((entry.operation.parse::<OperationKind>()?, entry.weight)))
            .collect::<DriverResult<Vec<_>>>()?;

        Self::new(
            WorkloadMix::from_weights(&weights)?,
            config.health_check_probability,
        )
    }

    /// Resolve a pair of draws `r, r2` in `[0, 1)`
    pub fn select(&self, r: f64, r2: f64) -> Selection {
        Selection {
            primary: self.mix.select(r),
            health_check: r2 < self.health_check_probability,
        }
    }

    pub fn draw<R: Rng>(&self, rng: &mut R) -> Selection {
        let r: f64 = rng.random();
        let r2: f64 = rng.random();
        self.select(r, r2)
    }

    pub fn mix(&self) -> &WorkloadMix {
        &self.mix
    }

    pub fn health_check_probability(&self) -> f64 {
        self.health_check_probability
    }
}
