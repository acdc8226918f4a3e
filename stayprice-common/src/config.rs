//! Bootstrap configuration and config file resolution
//!
//! Settings priority:
//! 1. Command-line arguments (applied by the binary)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing config file is not an error: the service logs a warning and
//! starts with built-in defaults. A malformed file is fatal.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::engine::DEFAULT_MAX_PREDICTIONS;
use crate::schema::Schema;
use crate::{Error, Result};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "STAYPRICE_CONFIG";

/// Default HTTP port
pub const DEFAULT_PORT: u16 = 5790;

/// Bootstrap configuration loaded from TOML
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TomlConfig {
    /// Interface to bind the HTTP server to
    pub bind: String,

    /// HTTP server port
    pub port: u16,

    /// Model artifact path; see [`default_model_path`] when unset
    pub model_path: Option<PathBuf>,

    /// Cap on model calls per request (0 disables the cap)
    pub max_predictions: usize,

    pub logging: LoggingConfig,

    /// Default value overrides, keyed by field name
    pub defaults: BTreeMap<String, f64>,

    /// Sweep candidate overrides, keyed by field name
    pub sweep: BTreeMap<String, Vec<f64>>,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            model_path: None,
            max_predictions: DEFAULT_MAX_PREDICTIONS,
            logging: LoggingConfig::default(),
            defaults: BTreeMap::new(),
            sweep: BTreeMap::new(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log file path (optional, logs to stderr if not specified)
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid TOML: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Invalid TOML in {}: {}", path.display(), e)))
    }

    /// Built-in tables with this file's overrides applied
    pub fn schema(&self) -> Result<Schema> {
        Schema::builtin().with_overrides(&self.defaults, &self.sweep)
    }

    pub fn model_path(&self) -> PathBuf {
        self.model_path.clone().unwrap_or_else(default_model_path)
    }

    /// Prediction cap, with 0 meaning unlimited
    pub fn prediction_budget(&self) -> Option<usize> {
        (self.max_predictions > 0).then_some(self.max_predictions)
    }
}

/// OS-dependent default model location
pub fn default_model_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("stayprice").join("price_model.json"))
        .unwrap_or_else(|| PathBuf::from("./price_model.json"))
}

/// Locates the config file
///
/// Priority: explicit path (CLI), `STAYPRICE_CONFIG`, user config dir,
/// `/etc/stayprice/config.toml` on Linux.
pub struct ConfigResolver {
    explicit: Option<PathBuf>,
}

impl ConfigResolver {
    pub fn new(explicit: Option<PathBuf>) -> Self {
        Self { explicit }
    }

    /// Path the user named through `--config` or `STAYPRICE_CONFIG`
    fn named(&self) -> Option<PathBuf> {
        if let Some(path) = &self.explicit {
            return Some(path.clone());
        }

        std::env::var(CONFIG_ENV_VAR)
            .ok()
            .filter(|path| !path.is_empty())
            .map(PathBuf::from)
    }

    /// Path of the config file to use, if any candidate applies
    pub fn resolve(&self) -> Option<PathBuf> {
        if let Some(path) = self.named() {
            return Some(path);
        }

        let user_config = dirs::config_dir().map(|d| d.join("stayprice").join("config.toml"));
        if let Some(path) = user_config.filter(|p| p.exists()) {
            return Some(path);
        }

        let system_config = PathBuf::from("/etc/stayprice/config.toml");
        if cfg!(target_os = "linux") && system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load the resolved config
    ///
    /// Falls back to defaults when no file is found in the standard
    /// locations. A named file that does not exist is an error.
    pub fn load(&self) -> Result<TomlConfig> {
        let Some(path) = self.resolve() else {
            warn!("No config file found, using built-in defaults");
            return Ok(TomlConfig::default());
        };

        if !path.exists() {
            return Err(Error::Config(format!("config file {} not found", path.display())));
        }

        let config = TomlConfig::load(&path)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }
}
