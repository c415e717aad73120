//! Per-operation outcomes and where they go

use crate::catalog::checks::Check;
use crate::operation::OperationKind;
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use taskload_http::{HttpError, TimedResponse};

/// Result of one executed operation.
///
/// `passed` is true only if every check passed. `status` and `elapsed`
/// are absent when the request never got a response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Sample {
    pub operation: OperationKind,
    pub passed: bool,
    pub status: Option<u16>,
    pub elapsed: Option<Duration>,
    pub checks: Vec<Check>,
}

impl Sample {
    pub fn from_response(
        operation: OperationKind,
        response: &Result<TimedResponse, HttpError>,
        checks: Vec<Check>,
    ) -> Self {
        let received = response.as_ref().ok();
        Self {
            operation,
            passed: checks.iter().all(|check| check.passed),
            status: received.map(|r| r.status),
            elapsed: received.map(|r| r.elapsed),
            checks,
        }
    }

    /// No response arrived at all
    pub fn is_transport_failure(&self) -> bool {
        self.status.is_none()
    }

    pub fn failed_checks(&self) -> impl Iterator<Item = &Check> {
        self.checks.iter().filter(|check| !check.passed)
    }
}

/// Aggregate receiving every sample a virtual user emits
pub trait SampleSink: Send + Sync {
    fn record(&self, sample: &Sample);
}

impl<T: SampleSink + ?Sized> SampleSink for Arc<T> {
    fn record(&self, sample: &Sample) {
        (**self).record(sample)
    }
}

/// Sink that drops everything
#[derive(Debug, Clone, Copy, Default)]
pub struct DiscardSink;

impl SampleSink for DiscardSink {
    fn record(&self, _sample: &Sample) {}
}

/// Sink keeping every sample in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    samples: Mutex<Vec<Sample>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(&self) -> Vec<Sample> {
        self.samples.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.samples.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.lock().is_empty()
    }

    /// Share of failed samples, 0 when nothing was recorded
    pub fn error_rate(&self) -> f64 {
        let samples = self.samples.lock();
        if samples.is_empty() {
            return 0.0;
        }
        let failed = samples.iter().filter(|sample| !sample.passed).count();
        failed as f64 / samples.len() as f64
    }
}

impl SampleSink for MemorySink {
    fn record(&self, sample: &Sample) {
        self.samples.lock().push(sample.clone());
    }
}
