//! End-of-run threshold evaluation

use crate::metrics::MetricsSnapshot;
use serde::Serialize;
use taskload_config::ThresholdsConfig;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThresholdResult {
    pub name: String,
    pub limit: f64,
    pub observed: f64,
    pub passed: bool,
}

impl ThresholdResult {
    fn below(name: &str, observed: f64, limit: f64) -> Self {
        Self {
            name: name.to_string(),
            limit,
            observed,
            passed: observed < limit,
        }
    }
}

/// Every threshold must stay strictly below its limit
pub fn evaluate(config: &ThresholdsConfig, metrics: &MetricsSnapshot) -> Vec<ThresholdResult> {
    vec![
        ThresholdResult::below("errors rate", metrics.error_rate, config.max_error_rate),
        ThresholdResult::below(
            "http_req_failed rate",
            metrics.http_req_failed_rate,
            config.max_http_failure_rate,
        ),
        ThresholdResult::below(
            "http_req_duration p(95) ms",
            metrics.http_req_duration.p95_ms,
            config.max_p95_duration.as_secs_f64() * 1000.0,
        ),
    ]
}
