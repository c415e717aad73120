//! Ramp-stage plan

use crate::error::{EngineError, EngineResult};
use std::time::Duration;
use taskload_config::RampConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stage {
    pub duration: Duration,
    pub target: usize,
}

/// Ordered stages; the virtual-user count ramps linearly from the
/// previous stage's target, starting at zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    stages: Vec<Stage>,
}

impl StagePlan {
    pub fn new(stages: Vec<Stage>) -> EngineResult<Self> {
        if stages.is_empty() {
            return Err(EngineError::InvalidPlan(
                "at least one stage is required".to_string(),
            ));
        }
        let plan = Self { stages };
        if plan.total_duration().is_zero() {
            return Err(EngineError::InvalidPlan(
                "total duration must be greater than 0".to_string(),
            ));
        }
        Ok(plan)
    }

    /// Jump straight to `vus` users and hold them for `duration`
    pub fn constant(vus: usize, duration: Duration) -> EngineResult<Self> {
        Self::new(vec![
            Stage {
                duration: Duration::ZERO,
                target: vus,
            },
            Stage {
                duration,
                target: vus,
            },
        ])
    }

    pub fn from_config(ramp: &RampConfig) -> EngineResult<Self> {
        Self::new(
            ramp.stages
                .iter()
                .map(|stage| Stage {
                    duration: stage.duration,
                    target: stage.target,
                })
                .collect(),
        )
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    pub fn max_target(&self) -> usize {
        self.stages.iter().map(|s| s.target).max().unwrap_or(0)
    }

    /// Desired virtual users at `elapsed`, or `None` once the plan is over
    pub fn desired_vus(&self, elapsed: Duration) -> Option<usize> {
        let mut start = Duration::ZERO;
        let mut previous = 0usize;

        for stage in &self.stages {
            let end = start + stage.duration;
            if elapsed < end {
                let progress = (elapsed - start).as_secs_f64() / stage.duration.as_secs_f64();
                let from = previous as f64;
                let to = stage.target as f64;
                return Some((from + (to - from) * progress).round() as usize);
            }
            start = end;
            previous = stage.target;
        }

        None
    }
}
