//! Host engine for taskload
//!
//! Schedules virtual users along a ramp-stage plan, aggregates their
//! samples into run metrics and evaluates pass/fail thresholds at the end.

pub mod engine;
pub mod error;
pub mod metrics;
pub mod stages;
pub mod summary;
pub mod thresholds;

pub use engine::{Engine, DEFAULT_TICK};
pub use error::{EngineError, EngineResult};
pub use metrics::{DurationStats, MetricsSnapshot, OperationCounts, RunMetrics};
pub use stages::{Stage, StagePlan};
pub use summary::RunSummary;
pub use thresholds::ThresholdResult;
