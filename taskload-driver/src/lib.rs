//! Virtual-user workload driver for the task API
//!
//! A virtual user repeatedly draws one primary operation from a weighted
//! mix (plus an occasional health check), executes it through the
//! [`catalog`], records a pass/fail [`Sample`] per executed operation and
//! paces itself before the next iteration. Each user owns a private
//! [`EntityIdPool`] of task ids learned from list and create responses.

pub mod catalog;
pub mod error;
pub mod operation;
pub mod pool;
pub mod runner;
pub mod sample;
pub mod selector;

pub use catalog::checks::Check;
pub use catalog::{Catalog, OperationRecord};
pub use error::{DriverError, DriverResult};
pub use operation::OperationKind;
pub use pool::{EntityIdPool, PoolLimits, TaskId};
pub use runner::{IterationReport, VirtualUser, Workload, DEFAULT_PACING};
pub use sample::{DiscardSink, MemorySink, Sample, SampleSink};
pub use selector::{ScenarioSelector, Selection, WorkloadMix};
