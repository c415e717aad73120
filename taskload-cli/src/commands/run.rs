//! `taskload run`

use super::{apply_target_host, build_client, load_config};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::time::Duration;
use taskload_config::RampConfig;
use taskload_engine::Engine;
use tracing::{error, info, warn};

pub struct RunOptions {
    pub target_host: Option<String>,
    pub vus: Option<usize>,
    pub duration: Option<u64>,
    pub summary_json: Option<PathBuf>,
    pub seed: Option<u64>,
}

pub async fn handle_run(config_path: Option<&Path>, options: RunOptions) -> Result<()> {
    let mut config = load_config(config_path)?;
    apply_target_host(&mut config, options.target_host.as_deref())?;

    if let (Some(vus), Some(duration)) = (options.vus, options.duration) {
        let tick = config.ramp.tick;
        config.ramp = RampConfig {
            tick,
            ..RampConfig::constant(vus, Duration::from_secs(duration))
        };
    }
    config
        .validate_all()
        .context("Invalid run configuration")?;

    info!("Target: {}", config.target.base_url);
    let client = build_client(&config)?;
    let engine = Engine::from_config(&config, client)
        .context("Failed to build engine")?
        .with_seed(options.seed);

    let summary = engine
        .run_until(async {
            if tokio::signal::ctrl_c().await.is_err() {
                warn!("Ctrl-C handler unavailable; run continues until the stages end");
                std::future::pending::<()>().await;
            }
        })
        .await;

    println!("{}", summary);

    if let Some(path) = &options.summary_json {
        summary
            .write_json(path)
            .with_context(|| format!("Failed to write summary to {}", path.display()))?;
    }

    if !summary.passed() {
        let breached: Vec<&str> = summary.breached().map(|t| t.name.as_str()).collect();
        error!("Thresholds breached: {}", breached.join(", "));
        return Err(anyhow::anyhow!("Thresholds breached: {}", breached.join(", ")));
    }

    Ok(())
}
