//! Driver error types
//!
//! These only surface while building a workload. Once virtual users are
//! iterating, every failure is folded into a sample instead.

use thiserror::Error;

pub type DriverResult<T> = Result<T, DriverError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DriverError {
    #[error("Unknown operation: '{0}'")]
    UnknownOperation(String),

    #[error("Operation '{0}' cannot be part of the primary mix")]
    NotPrimary(String),

    #[error("Invalid workload mix: {0}")]
    InvalidMix(String),

    #[error("Invalid pool limits: {0}")]
    InvalidPoolLimits(String),

    #[error("Invalid probability for {field}: {value}")]
    InvalidProbability { field: &'static str, value: f64 },
}
