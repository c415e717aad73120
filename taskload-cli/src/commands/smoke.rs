//! `taskload smoke`: a short contract check with one virtual user

use super::{apply_target_host, build_client, load_config};
use anyhow::{Context, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use taskload_driver::{MemorySink, Sample, VirtualUser, Workload};
use tracing::info;

pub async fn handle_smoke(
    config_path: Option<&Path>,
    target_host: Option<&str>,
    iterations: u32,
    seed: Option<u64>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_target_host(&mut config, target_host)?;

    let workload = Workload::from_config(&config.target, &config.workload)
        .context("Invalid workload configuration")?
        .with_pacing(Duration::ZERO);
    let rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    info!(
        "Smoke testing {} with {} iterations",
        config.target.base_url, iterations
    );

    let sink = Arc::new(MemorySink::new());
    let mut user = VirtualUser::new(0, build_client(&config)?, Arc::new(workload), rng, sink.clone());

    for iteration in 1..=iterations {
        let report = user.iterate().await;
        if report.primary.is_none() {
            println!("{:>3}  -    {:<14} skipped", iteration, report.selection.primary);
        }
        for sample in report.samples() {
            println!("{:>3}  {}", iteration, describe(sample));
            for check in sample.failed_checks() {
                println!("       ✗ {}", check.name);
            }
        }
    }

    let failed = sink.samples().iter().filter(|s| !s.passed).count();
    println!();
    println!(
        "{} samples, {} failed, pool holds {} ids",
        sink.len(),
        failed,
        user.pool().len()
    );

    if failed > 0 {
        return Err(anyhow::anyhow!("{} of {} samples failed", failed, sink.len()));
    }
    Ok(())
}

fn describe(sample: &Sample) -> String {
    let status = sample
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "---".to_string());
    let elapsed = sample
        .elapsed
        .map(|e| format!("{}ms", e.as_millis()))
        .unwrap_or_default();
    format!(
        "{}  {:<14} {} {}",
        if sample.passed { "✓" } else { "✗" },
        sample.operation,
        status,
        elapsed
    )
}
