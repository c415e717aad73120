use anyhow::{Context, Result};
use clap::Parser;
use taskload_config::{LogFormat, LoggingConfig};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, ConfigCommands};
use commands::run::RunOptions;

/// Initialize tracing.
///
/// `--log-level` wins over `RUST_LOG`, which wins over the configured level.
/// Output goes to stderr so summaries on stdout stay clean.
fn init_logging(config: &LoggingConfig, log_level: Option<&String>) -> Result<()> {
    let env_filter = match log_level {
        Some(level) => EnvFilter::try_new(level).unwrap_or_else(|_| {
            eprintln!("Invalid log level '{}', falling back to 'info'", level);
            EnvFilter::new("info")
        }),
        None => EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(config.level.as_str())),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_file(config.include_location)
        .with_line_number(config.include_location);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Compact => builder.compact().init(),
        LogFormat::Pretty => builder.pretty().init(),
        LogFormat::Text => builder.init(),
    }

    debug!("Tracing initialized");
    Ok(())
}

/// Logging settings before the full configuration is validated
fn bootstrap_logging_config(cli: &Cli) -> LoggingConfig {
    commands::load_config(cli.config.as_deref())
        .map(|config| config.logging)
        .unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&bootstrap_logging_config(&cli), cli.log_level.as_ref())?;

    match cli.command {
        Some(Commands::Run {
            target_host,
            vus,
            duration,
            summary_json,
            seed,
        }) => {
            commands::handle_run(
                cli.config.as_deref(),
                RunOptions {
                    target_host,
                    vus,
                    duration,
                    summary_json,
                    seed,
                },
            )
            .await
        }
        Some(Commands::Smoke {
            target_host,
            iterations,
            seed,
        }) => {
            commands::handle_smoke(
                cli.config.as_deref(),
                target_host.as_deref(),
                iterations,
                seed,
            )
            .await
        }
        Some(Commands::Config { config_cmd }) => match config_cmd {
            ConfigCommands::Validate { config_file } => {
                commands::handle_config_validate(config_file.as_deref().or(cli.config.as_deref()))
            }
            ConfigCommands::Generate { output, force } => {
                commands::handle_config_generate(output.as_deref(), force)
            }
        },
        None => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            cmd.print_help().context("Failed to print help")?;
            println!();
            Ok(())
        }
    }
}
