//! Engine error types

use taskload_driver::DriverError;
use thiserror::Error;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid stage plan: {0}")]
    InvalidPlan(String),

    #[error("Workload error: {0}")]
    Workload(#[from] DriverError),

    #[error("Failed to write summary: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to serialize summary: {0}")]
    Serialization(#[from] serde_json::Error),
}
