//! CLI argument parsing definitions

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the ramp-stage load test
    Run {
        /// Base URL of the task API
        #[arg(long, value_name = "URL", env = "TARGET_HOST")]
        target_host: Option<String>,

        /// Hold this many virtual users instead of the configured stages
        #[arg(long, value_name = "N", requires = "duration")]
        vus: Option<usize>,

        /// Run length in seconds, used with --vus
        #[arg(long, value_name = "SECS", requires = "vus")]
        duration: Option<u64>,

        /// Write the run summary as JSON
        #[arg(long, value_name = "PATH")]
        summary_json: Option<PathBuf>,

        /// Seed for reproducible operation draws
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },

    /// Run one virtual user for a few unpaced iterations
    Smoke {
        /// Base URL of the task API
        #[arg(long, value_name = "URL", env = "TARGET_HOST")]
        target_host: Option<String>,

        /// Number of iterations
        #[arg(long, value_name = "N", default_value = "10")]
        iterations: u32,

        /// Seed for reproducible operation draws
        #[arg(long, value_name = "N")]
        seed: Option<u64>,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: Option<PathBuf>,
    },

    /// Generate a sample configuration file
    Generate {
        /// Output file path; prints to stdout when omitted
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        temp_env::with_var_unset("TARGET_HOST", || Cli::try_parse_from(args))
    }

    #[test]
    fn test_run_arguments() {
        let cli = parse(&[
            "taskload",
            "--log-level",
            "debug",
            "run",
            "--target-host",
            "http://api:8080",
            "--vus",
            "5",
            "--duration",
            "30",
        ])
        .unwrap();

        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Some(Commands::Run {
                target_host,
                vus,
                duration,
                ..
            }) => {
                assert_eq!(target_host.as_deref(), Some("http://api:8080"));
                assert_eq!(vus, Some(5));
                assert_eq!(duration, Some(30));
            }
            _ => panic!("expected run command"),
        }
    }

    #[test]
    fn test_vus_requires_duration() {
        assert!(parse(&["taskload", "run", "--vus", "5"]).is_err());
    }

    #[test]
    fn test_target_host_from_env() {
        let cli = temp_env::with_var("TARGET_HOST", Some("http://from-env:9000"), || {
            Cli::try_parse_from(["taskload", "smoke"])
        })
        .unwrap();

        match cli.command {
            Some(Commands::Smoke {
                target_host,
                iterations,
                ..
            }) => {
                assert_eq!(target_host.as_deref(), Some("http://from-env:9000"));
                assert_eq!(iterations, 10);
            }
            _ => panic!("expected smoke command"),
        }
    }

    #[test]
    fn test_config_generate() {
        let cli = parse(&["taskload", "config", "generate", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Config {
                config_cmd: ConfigCommands::Generate { output: None, force: true }
            })
        ));
    }
}
