//! Run summary

use crate::error::EngineResult;
use crate::metrics::MetricsSnapshot;
use crate::thresholds::ThresholdResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub started_at: DateTime<Utc>,
    pub duration_secs: f64,
    /// Stopped by a shutdown signal before the plan finished
    pub interrupted: bool,
    pub metrics: MetricsSnapshot,
    pub thresholds: Vec<ThresholdResult>,
}

impl RunSummary {
    pub fn passed(&self) -> bool {
        self.thresholds.iter().all(|t| t.passed)
    }

    pub fn breached(&self) -> impl Iterator<Item = &ThresholdResult> {
        self.thresholds.iter().filter(|t| !t.passed)
    }

    pub fn to_json(&self) -> EngineResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn write_json(&self, path: &Path) -> EngineResult<()> {
        std::fs::write(path, self.to_json()?)?;
        info!("Summary written to {}", path.display());
        Ok(())
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        writeln!(f, "Run started {} ({:.1}s)", self.started_at.to_rfc3339(), self.duration_secs)?;
        if self.interrupted {
            writeln!(f, "  (interrupted)")?;
        }
        writeln!(f)?;
        writeln!(f, "  iterations ........... {}", m.iterations)?;
        writeln!(f, "  vus_max .............. {}", m.peak_vus)?;
        writeln!(
            f,
            "  errors ............... {:.2}% ({} of {})",
            m.error_rate * 100.0,
            m.failed_samples,
            m.samples
        )?;
        writeln!(f, "  http_reqs ............ {}", m.http_reqs)?;
        writeln!(
            f,
            "  http_req_failed ...... {:.2}% ({} of {})",
            m.http_req_failed_rate * 100.0,
            m.http_req_failed,
            m.http_reqs
        )?;
        let d = &m.http_req_duration;
        writeln!(
            f,
            "  http_req_duration .... min={:.1}ms avg={:.1}ms max={:.1}ms p(95)={:.1}ms",
            d.min_ms, d.mean_ms, d.max_ms, d.p95_ms
        )?;

        writeln!(f)?;
        writeln!(f, "  {:<14} {:>8} {:>8}", "operation", "passed", "failed")?;
        for (operation, counts) in &m.operations {
            writeln!(
                f,
                "  {:<14} {:>8} {:>8}",
                operation, counts.passed, counts.failed
            )?;
        }

        writeln!(f)?;
        for threshold in &self.thresholds {
            writeln!(
                f,
                "  {} {} {:.4} < {:.4}",
                if threshold.passed { "✓" } else { "✗" },
                threshold.name,
                threshold.observed,
                threshold.limit
            )?;
        }
        Ok(())
    }
}
