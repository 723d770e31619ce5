//! FocusTrain CLI — run the gaze-tracking pipeline without a camera.
//!
//! Usage:
//!   focustrain simulate [OPTIONS]     Run a session against a synthetic viewer
//!   focustrain replay <TRACE>         Replay a recorded landmark trace
//!   focustrain config show|init       Inspect or create the config file

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use focustrain_common::config::AppConfig;

mod commands;
mod session;
mod simulation;
mod trace_recorder;

#[derive(Parser)]
#[command(
    name = "focustrain",
    about = "Gaze-driven focus training: calibration, tracking and scoring",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to the standard location)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a session against a synthetic viewer
    Simulate {
        /// Session length (seconds), calibration included
        #[arg(short, long, default_value = "60")]
        duration: f64,

        /// Seed for the viewer and the target
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Pupil jitter per axis (fraction of the eye box)
        #[arg(long, default_value = "0.004")]
        noise: f64,

        /// Probability of a frame without a detected face
        #[arg(long, default_value = "0.02")]
        dropout: f64,

        /// Probability of a frame with closed eyes
        #[arg(long, default_value = "0.01")]
        blink: f64,

        /// Pupil travel for a gaze at an edge anchor
        #[arg(long, default_value = "0.15")]
        eye_range: f64,

        /// Record the landmark stream to a JSONL trace
        #[arg(long)]
        record: Option<PathBuf>,

        /// Write the JSON summary here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replay a recorded landmark trace
    Replay {
        /// Path to the trace file
        trace: PathBuf,

        /// Seed for the target
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Write the JSON summary here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Inspect or create the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the effective configuration
    Show,

    /// Write the default configuration
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display())),
        None => Ok(AppConfig::load()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Commands::Config {
        action: ConfigAction::Init { force },
    } = cli.command
    {
        return commands::config::init(cli.config, force);
    }

    let config = load_config(cli.config.as_ref())?;

    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    focustrain_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Simulate {
            duration,
            seed,
            noise,
            dropout,
            blink,
            eye_range,
            record,
            output,
        } => commands::simulate::run(
            config,
            commands::simulate::SimulateOptions {
                duration_secs: duration,
                seed,
                viewer: simulation::ViewerParams {
                    eye_range,
                    noise,
                    dropout,
                    blink,
                },
                record,
                output,
            },
        ),
        Commands::Replay {
            trace,
            seed,
            output,
        } => commands::replay::run(config, trace, seed, output),
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(&config),
            ConfigAction::Init { force } => commands::config::init(cli.config, force),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_simulate_defaults() {
        let cli = Cli::try_parse_from(["focustrain", "simulate"]).unwrap();
        match cli.command {
            Commands::Simulate {
                duration,
                seed,
                record,
                ..
            } => {
                assert_eq!(duration, 60.0);
                assert_eq!(seed, 42);
                assert!(record.is_none());
            }
            _ => panic!("expected simulate"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli =
            Cli::try_parse_from(["focustrain", "replay", "t.jsonl", "-v", "--config", "c.json"])
                .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("c.json")));
        assert!(matches!(cli.command, Commands::Replay { .. }));
    }

    #[test]
    fn test_config_init_flag() {
        let cli = Cli::try_parse_from(["focustrain", "config", "init", "--force"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Config {
                action: ConfigAction::Init { force: true }
            }
        ));
    }
}
