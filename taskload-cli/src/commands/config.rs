//! `taskload config`

use super::load_config;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use taskload_config::TaskloadConfig;
use tracing::{error, info};

pub fn handle_config_validate(config_file: Option<&Path>) -> Result<()> {
    if let Some(path) = config_file {
        info!("Validating configuration file: {}", path.display());
        if !path.exists() {
            return Err(anyhow::anyhow!(
                "Configuration file not found: {}",
                path.display()
            ));
        }
    }

    match load_config(config_file) {
        Ok(_config) => {
            println!("✅ Configuration is valid");
            info!("Configuration validation passed");
            Ok(())
        }
        Err(e) => {
            println!("❌ Configuration validation failed: {:#}", e);
            error!("Configuration validation failed: {:#}", e);
            Err(e)
        }
    }
}

pub fn handle_config_generate(output: Option<&Path>, force: bool) -> Result<()> {
    let content = TaskloadConfig::generate_sample();

    let Some(output) = output else {
        print!("{}", content);
        return Ok(());
    };

    if output.exists() && !force {
        return Err(anyhow::anyhow!(
            "Output file already exists: {}. Use --force to overwrite.",
            output.display()
        ));
    }

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent).context("Failed to create output directory")?;
    }

    fs::write(output, content)
        .with_context(|| format!("Failed to write configuration to {}", output.display()))?;
    println!("✅ Configuration written to {}", output.display());
    Ok(())
}
