//! CLI command implementations

pub mod config;
pub mod run;
pub mod smoke;

pub use config::{handle_config_generate, handle_config_validate};
pub use run::handle_run;
pub use smoke::handle_smoke;

use anyhow::{Context, Result};
use std::path::Path;
use std::sync::Arc;
use taskload_config::{ConfigLoader, TaskloadConfig, Validatable};
use taskload_http::{HttpClient, ReqwestClient};
use tracing::info;

/// Load configuration from file, or from defaults and environment
pub fn load_config(config_path: Option<&Path>) -> Result<TaskloadConfig> {
    let loader = ConfigLoader::new();

    match config_path {
        Some(path) => {
            info!("Loading configuration from: {}", path.display());
            loader
                .from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))
        }
        None => loader
            .from_env()
            .context("Failed to load configuration from environment"),
    }
}

/// Point the config at another host and re-validate
fn apply_target_host(config: &mut TaskloadConfig, target_host: Option<&str>) -> Result<()> {
    if let Some(host) = target_host {
        config.target.base_url = host.to_string();
        config
            .target
            .validate()
            .with_context(|| format!("Invalid target host: {}", host))?;
    }
    Ok(())
}

fn build_client(config: &TaskloadConfig) -> Result<Arc<dyn HttpClient>> {
    let client = ReqwestClient::with_config(config.http.clone().into())
        .context("Failed to create HTTP client")?;
    Ok(Arc::new(client))
}
