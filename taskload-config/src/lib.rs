//! Domain-driven configuration management for taskload
//!
//! Configuration is split by functional domain (target, http, workload,
//! ramp, thresholds, logging), each with its own defaults and validation.

pub mod error;
pub mod loader;
pub mod validation;

// Domain-specific configuration modules
pub mod domains;

// Re-export main types
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;
pub use validation::Validatable;

// Re-export domain configurations
pub use domains::{
    http::HttpConfig,
    logging::{LogFormat, LogLevel, LoggingConfig},
    ramp::{RampConfig, StageConfig},
    target::TargetConfig,
    thresholds::ThresholdsConfig,
    workload::{MixEntryConfig, PoolConfig, WorkloadConfig, WEIGHT_SUM_TOLERANCE},
    TaskloadConfig,
};

// Re-export utilities
pub use domains::utils::{serde_duration, serde_duration_millis};
