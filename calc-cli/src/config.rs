//! Optional TOML configuration for the `calc` binary.
//!
//! ```toml
//! log_level = "info"
//! log_file = "calc.log"
//! units = "imperial"
//! decimals = 3
//! ```
//!
//! Every key is optional. Command-line flags override file values.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use calc_core::UnitSystem;
use serde::Deserialize;
use tracing::debug;

use crate::logging::DEFAULT_LOG_LEVEL;

/// Read from the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_PATH: &str = "calc.toml";

/// Places shown for plain numbers when nothing else is configured.
pub const DEFAULT_DECIMALS: usize = 2;

/// Upper bound for `decimals`.
const MAX_DECIMALS: usize = 12;

/// Contents of a config file, as written.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    /// Unit system applied to calculators that have a `units` field.
    pub units: Option<String>,
    pub decimals: Option<usize>,
}

impl Config {
    /// Parses config text.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Config = toml::from_str(text).context("invalid config file")?;
        // Surface a bad unit name at load time rather than at first use.
        config.unit_system()?;
        Ok(config)
    }

    /// Loads `explicit` when given, otherwise [`DEFAULT_CONFIG_PATH`] if it
    /// exists.
    ///
    /// # Errors
    ///
    /// An explicit path that cannot be read or parsed is an error; a missing
    /// default file is not.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(path) => path,
            None => {
                let default = Path::new(DEFAULT_CONFIG_PATH);
                if !default.exists() {
                    debug!("no config file, using defaults");
                    return Ok(Self::default());
                }
                default
            }
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read config file '{}'", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("in config file '{}'", path.display()))
    }

    pub fn unit_system(&self) -> Result<Option<UnitSystem>> {
        self.units
            .as_deref()
            .map(|units| units.parse::<UnitSystem>())
            .transpose()
            .context("invalid 'units' in config")
    }
}

/// Effective settings after command-line flags are applied over the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// `None` keeps `RUST_LOG` or the default filter.
    pub log_level: Option<String>,
    pub log_file: Option<PathBuf>,
    pub units: Option<UnitSystem>,
    pub decimals: usize,
}

impl Settings {
    pub fn resolve(
        config: Config,
        log_level: Option<String>,
        log_file: Option<PathBuf>,
    ) -> Result<Self> {
        let units = config.unit_system()?;
        let decimals = config.decimals.unwrap_or(DEFAULT_DECIMALS);
        if decimals > MAX_DECIMALS {
            anyhow::bail!("'decimals' must be at most {MAX_DECIMALS}, got {decimals}");
        }
        Ok(Self {
            log_level: log_level.or(config.log_level),
            log_file: log_file.or(config.log_file),
            units,
            decimals,
        })
    }

    /// Filter to apply once logging is up.
    pub fn effective_log_level(&self) -> &str {
        self.log_level.as_deref().unwrap_or(DEFAULT_LOG_LEVEL)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_level: None,
            log_file: None,
            units: None,
            decimals: DEFAULT_DECIMALS,
        }
    }
}
