//! Run-wide metrics aggregate

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;
use taskload_driver::{OperationKind, Sample, SampleSink};

/// Pass/fail tally for one operation kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OperationCounts {
    pub passed: u64,
    pub failed: u64,
}

/// Request duration statistics, in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DurationStats {
    pub min_ms: f64,
    pub mean_ms: f64,
    pub max_ms: f64,
    pub p95_ms: f64,
}

impl DurationStats {
    /// Nearest-rank statistics; all zero when `durations` is empty
    pub fn from_durations(durations: &mut [Duration]) -> Self {
        if durations.is_empty() {
            return Self::default();
        }
        durations.sort_unstable();

        let total: Duration = durations.iter().sum();
        let len = durations.len();
        Self {
            min_ms: millis(durations[0]),
            mean_ms: millis(total) / len as f64,
            max_ms: millis(durations[len - 1]),
            p95_ms: millis(durations[len * 95 / 100]),
        }
    }
}

fn millis(duration: Duration) -> f64 {
    duration.as_secs_f64() * 1000.0
}

/// Point-in-time copy of [`RunMetrics`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub iterations: u64,
    pub samples: u64,
    pub failed_samples: u64,
    /// Failed samples over samples
    pub error_rate: f64,
    pub http_reqs: u64,
    pub http_req_failed: u64,
    /// Transport errors and statuses of 400 and above over requests
    pub http_req_failed_rate: f64,
    pub http_req_duration: DurationStats,
    pub operations: BTreeMap<String, OperationCounts>,
    pub peak_vus: usize,
}

/// Shared sink fed by every virtual user of a run
#[derive(Debug, Default)]
pub struct RunMetrics {
    iterations: AtomicU64,
    samples: AtomicU64,
    failed_samples: AtomicU64,
    http_reqs: AtomicU64,
    http_req_failed: AtomicU64,
    peak_vus: AtomicUsize,
    durations: Mutex<Vec<Duration>>,
    operations: Mutex<BTreeMap<OperationKind, OperationCounts>>,
}

impl RunMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_iterations(&self, iterations: u64) {
        self.iterations.fetch_add(iterations, Ordering::Relaxed);
    }

    pub fn observe_vus(&self, active: usize) {
        self.peak_vus.fetch_max(active, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let samples = self.samples.load(Ordering::Relaxed);
        let failed_samples = self.failed_samples.load(Ordering::Relaxed);
        let http_reqs = self.http_reqs.load(Ordering::Relaxed);
        let http_req_failed = self.http_req_failed.load(Ordering::Relaxed);

        let mut durations = self.durations.lock().clone();

        MetricsSnapshot {
            iterations: self.iterations.load(Ordering::Relaxed),
            samples,
            failed_samples,
            error_rate: rate(failed_samples, samples),
            http_reqs,
            http_req_failed,
            http_req_failed_rate: rate(http_req_failed, http_reqs),
            http_req_duration: DurationStats::from_durations(&mut durations),
            operations: self
                .operations
                .lock()
                .iter()
                .map(|(kind, counts)| (kind.to_string(), *counts))
                .collect(),
            peak_vus: self.peak_vus.load(Ordering::Relaxed),
        }
    }
}

fn rate(part: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        part as f64 / total as f64
    }
}

impl SampleSink for RunMetrics {
    fn record(&self, sample: &Sample) {
        self.samples.fetch_add(1, Ordering::Relaxed);
        if !sample.passed {
            self.failed_samples.fetch_add(1, Ordering::Relaxed);
        }

        // every sample is one request
        self.http_reqs.fetch_add(1, Ordering::Relaxed);
        if sample.status.is_none_or(|status| status >= 400) {
            self.http_req_failed.fetch_add(1, Ordering::Relaxed);
        }
        if let Some(elapsed) = sample.elapsed {
            self.durations.lock().push(elapsed);
        }

        let mut operations = self.operations.lock();
        let counts = operations.entry(sample.operation).or_default();
        if sample.passed {
            counts.passed += 1;
        } else {
            counts.failed += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(operation: OperationKind, passed: bool, status: Option<u16>, ms: u64) -> Sample {
        Sample {
            operation,
            passed,
            status,
            elapsed: status.map(|_| Duration::from_millis(ms)),
            checks: Vec::new(),
        }
    }

    #[test]
    fn test_percentile_by_nearest_rank() {
        let mut durations: Vec<Duration> = (1..=100).rev().map(Duration::from_millis).collect();
        let stats = DurationStats::from_durations(&mut durations);
        assert_eq!(stats.min_ms, 1.0);
        assert_eq!(stats.max_ms, 100.0);
        assert_eq!(stats.p95_ms, 96.0);
        assert!((stats.mean_ms - 50.5).abs() < 1e-9);

        let mut one = vec![Duration::from_millis(7)];
        assert_eq!(DurationStats::from_durations(&mut one).p95_ms, 7.0);
        assert_eq!(DurationStats::from_durations(&mut []), DurationStats::default());
    }

    #[test]
    fn test_not_found_counts_as_http_failure_only() {
        let metrics = RunMetrics::new();
        metrics.record(&sample(OperationKind::ReadById, true, Some(404), 10));
        metrics.record(&sample(OperationKind::List, true, Some(200), 20));
        metrics.record(&sample(OperationKind::Create, false, None, 0));
        metrics.record(&sample(OperationKind::List, false, Some(200), 30));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.samples, 4);
        assert_eq!(snapshot.failed_samples, 2);
        assert!((snapshot.error_rate - 0.5).abs() < 1e-9);
        assert_eq!(snapshot.http_reqs, 4);
        assert_eq!(snapshot.http_req_failed, 2);
        assert_eq!(snapshot.http_req_duration.max_ms, 30.0);
        assert_eq!(
            snapshot.operations["list"],
            OperationCounts {
                passed: 1,
                failed: 1
            }
        );
    }

    #[test]
    fn test_empty_snapshot() {
        let metrics = RunMetrics::new();
        metrics.observe_vus(3);
        metrics.observe_vus(1);
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.error_rate, 0.0);
        assert_eq!(snapshot.http_req_failed_rate, 0.0);
        assert_eq!(snapshot.peak_vus, 3);
    }
}
