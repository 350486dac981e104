//! Run configuration for the `populace` binary.
//!
//! Settings live in `populace.yaml` in the working directory (or the file
//! passed with `--config`). Every section is optional and command-line
//! flags take precedence over file values:
//!
//! ```yaml
//! population:
//!   estimates: data/estimates.json
//!   size: 1000
//!   order_strategy: topological   # or single-pass
//!   format: csv                   # or json
//! rental:
//!   max_history: 4
//!   success_chance: 0.7
//!   start_application_id: 0
//!   seed: 42
//! logging:
//!   level: info
//! ```
//!
//! `POPULACE_LOG` overrides `logging.level`.

use std::path::{Path, PathBuf};

use populace_core::OrderStrategy;
use populace_rental::RentalConfig;
use serde::Deserialize;

use crate::output::OutputFormat;

/// Default config file, looked up in the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "populace.yaml";

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "POPULACE_LOG";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level run configuration, mirroring `populace.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PopulaceConfig {
    /// Population generation settings.
    #[serde(default)]
    pub population: PopulationSettings,

    /// Rental history generation settings.
    #[serde(default)]
    pub rental: RentalConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PopulaceConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }

    /// Load `explicit` if given, else `populace.yaml` if present, else
    /// defaults. Returns the path that was read, if any.
    pub fn discover(explicit: Option<&Path>) -> Result<(Self, Option<PathBuf>), ConfigError> {
        if let Some(path) = explicit {
            return Ok((Self::from_file(path)?, Some(path.to_path_buf())));
        }
        let default_path = Path::new(DEFAULT_CONFIG_PATH);
        if default_path.exists() {
            Ok((Self::from_file(default_path)?, Some(default_path.to_path_buf())))
        } else {
            let mut config = Self::default();
            config.logging.apply_env_overrides();
            Ok((config, None))
        }
    }
}

/// The `population` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PopulationSettings {
    /// Estimate table file (`.json`, `.yaml` or `.yml`).
    #[serde(default)]
    pub estimates: Option<PathBuf>,

    /// Number of individuals to generate.
    #[serde(default)]
    pub size: Option<u32>,

    /// How the dimension order is resolved.
    #[serde(default)]
    pub order_strategy: OrderStrategy,

    /// Output format for the roster.
    #[serde(default)]
    pub format: OutputFormat,
}

/// The `logging` section.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl LoggingConfig {
    fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV)
            && !level.trim().is_empty()
        {
            self.level = level;
        }
    }
}

fn default_log_level() -> String {
    String::from("info")
}
