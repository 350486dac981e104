//! Error types for the `populace` binary.
//!
//! [`CliError`] is the top-level error type that wraps every failure mode
//! of loading inputs, generating, and writing outputs.

use std::path::PathBuf;

use crate::config::ConfigError;

/// Top-level error for the `populace` binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Run configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// The estimate table could not be loaded.
    #[error("estimates error: {source}")]
    Estimates {
        /// The underlying estimate error.
        #[from]
        source: populace_core::EstimateError,
    },

    /// Population generation failed.
    #[error("generation error: {source}")]
    Generation {
        /// The underlying generation error.
        #[from]
        source: populace_core::GenerationError,
    },

    /// Rental history generation failed.
    #[error("rental history error: {source}")]
    Rental {
        /// The underlying rental error.
        #[from]
        source: populace_rental::RentalError,
    },

    /// Reading or writing CSV failed.
    #[error("CSV error: {source}")]
    Csv {
        /// The underlying CSV error.
        #[from]
        source: csv::Error,
    },

    /// Writing JSON output failed.
    #[error("JSON error: {source}")]
    Json {
        /// The underlying JSON error.
        #[from]
        source: serde_json::Error,
    },

    /// Opening or flushing an output failed.
    #[error("I/O error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A required setting was given neither on the command line nor in the
    /// config file.
    #[error("missing setting: pass --{flag} or set {key} in the config file")]
    MissingSetting {
        /// Command-line flag for the setting.
        flag: &'static str,
        /// Config file key for the setting.
        key: &'static str,
    },

    /// An input CSV lacks a required column.
    #[error("{} has no {column:?} column", path.display())]
    MissingColumn {
        /// The CSV file.
        path: PathBuf,
        /// The required column.
        column: &'static str,
    },

    /// The logging subscriber could not be installed.
    #[error("logging error: {message}")]
    Logging {
        /// Description of the failure.
        message: String,
    },
}
