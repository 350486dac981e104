//! `populace` command-line tool.
//!
//! Generates a synthetic population from an estimate table, or rental
//! application histories for an existing roster. Results are written as CSV
//! (or JSON for rosters) to stdout or a file; logs go to stderr.
//!
//! # Startup Sequence
//!
//! 1. Parse command-line arguments
//! 2. Load configuration from `--config` or `populace.yaml`
//! 3. Initialize structured logging (tracing) to stderr
//! 4. Run the selected subcommand
//!
//! # Usage
//!
//! ```text
//! populace population --estimates data/estimates.json --population-size 1000 > people.csv
//! populace rental-history --individuals people.csv --properties data/properties.csv --seed 7
//! ```

mod commands;
mod config;
mod error;
mod input;
mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::commands::{PopulationArgs, RentalHistoryArgs};
use crate::config::PopulaceConfig;
use crate::error::CliError;

#[derive(Debug, Parser)]
#[command(name = "populace", version, about = "Synthetic population generator")]
struct Cli {
    /// Configuration file (defaults to ./populace.yaml when present).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Generate a population matching the estimate table.
    Population(PopulationArgs),
    /// Generate rental application histories for a roster.
    RentalHistory(RentalHistoryArgs),
}

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, logging setup, or the subcommand fails.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Parse arguments.
    let cli = Cli::parse();

    // 2. Load configuration.
    let (config, config_path) = PopulaceConfig::discover(cli.config.as_deref())?;

    // 3. Initialize structured logging.
    init_logging(&config)?;
    info!(
        config = %config_path
            .as_ref()
            .map_or_else(|| String::from("defaults"), |p| p.display().to_string()),
        log_level = %config.logging.level,
        "Configuration loaded"
    );

    // 4. Run the subcommand.
    match &cli.command {
        Command::Population(args) => commands::population(args, &config)?,
        Command::RentalHistory(args) => commands::rental_history(args, &config)?,
    }

    Ok(())
}

/// `RUST_LOG` wins over the configured level.
fn init_logging(config: &PopulaceConfig) -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .map_err(|e| CliError::Logging {
            message: format!("invalid log level {:?}: {e}", config.logging.level),
        })?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|e| CliError::Logging {
            message: format!("{e}"),
        })
}
