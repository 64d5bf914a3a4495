//! Configuration module for trace-topology
//!
//! Bring-up reads a single TOML file describing where the hardware
//! description lives, how strictly links are validated, where to export the
//! discovered topology and how to log.
//!
//! # Config Location
//!
//! Without an explicit path the config is read from the platform config dir:
//! - **Linux**: `~/.config/trace-topology/config.toml`
//! - **macOS**: `~/Library/Application Support/trace-topology/config.toml`
//! - **Windows**: `%APPDATA%\trace-topology\config.toml`
//!
//! # Example
//!
//! ```toml
//! description_path = "/etc/trace/hardware.toml"
//! validate_links = "strict"
//! export_path = "/var/lib/trace/topology.json"
//! pmu_name = "xuantie_ntrace"
//!
//! [logging]
//! filter = "info,trace_topology=debug"
//! file = "/var/log/trace-topology.log"
//! ```

use crate::error::{Result, TopologyError};
use crate::facade::DEFAULT_PMU_NAME;
use crate::topology::LinkValidation;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "trace-topology";

/// Config filename inside the app config directory
pub const CONFIG_FILE: &str = "config.toml";

/// Default hardware description filename
pub const DEFAULT_DESCRIPTION_FILE: &str = "hardware.toml";

/// Get the platform config directory for this application
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

/// Get the path of the default config file
pub fn default_config_path() -> Option<PathBuf> {
    config_dir().map(|p| p.join(CONFIG_FILE))
}

/// Logging settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string; `RUST_LOG` takes precedence when set
    #[serde(default = "default_log_filter")]
    pub filter: String,

    /// Also write logs to this file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

fn default_log_filter() -> String {
    "info,trace_topology=debug".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            file: None,
        }
    }
}

/// Bring-up configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryConfig {
    /// Hardware description file (TOML, or JSON by extension)
    #[serde(default = "default_description_path")]
    pub description_path: PathBuf,

    /// Post-discovery link validation mode
    #[serde(default)]
    pub validate_links: LinkValidation,

    /// Write a JSON topology snapshot here after bring-up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_path: Option<PathBuf>,

    /// Name the event facility registers under
    #[serde(default = "default_pmu_name")]
    pub pmu_name: String,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn default_description_path() -> PathBuf {
    PathBuf::from(DEFAULT_DESCRIPTION_FILE)
}

fn default_pmu_name() -> String {
    DEFAULT_PMU_NAME.to_string()
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            description_path: default_description_path(),
            validate_links: LinkValidation::default(),
            export_path: None,
            pmu_name: default_pmu_name(),
            logging: LoggingConfig::default(),
        }
    }
}

impl DiscoveryConfig {
    /// Load a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TopologyError::Config(format!("Failed to read config {:?}: {}", path, e))
        })?;

        toml::from_str(&content).map_err(|e| {
            TopologyError::Config(format!("Failed to parse config {:?}: {}", path, e))
        })
    }

    /// Load a config file, returning defaults if it is absent or invalid
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        Self::load(path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save as TOML, creating parent directories
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                TopologyError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| TopologyError::Config(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            TopologyError::Config(format!("Failed to write config {:?}: {}", path, e))
        })
    }

    /// Resolve `description_path` against the directory of the config file
    pub fn resolve_description_path(&self, config_path: Option<&Path>) -> PathBuf {
        match config_path.and_then(Path::parent) {
            Some(dir) if self.description_path.is_relative() => dir.join(&self.description_path),
            _ => self.description_path.clone(),
        }
    }
}
