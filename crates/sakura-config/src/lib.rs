//! Configuration for sakura.
//!
//! Settings are read from `config.toml` in the platform configuration
//! directory. A missing file is not an error: every value has a default and
//! a file only needs to name what it overrides.

use std::fs;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use log::debug;
use sakura_core::FieldConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name inside the configuration directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Errors that can occur while reading or writing the configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Filesystem I/O error
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Serializing the configuration failed
    #[error("could not serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// No platform configuration directory could be determined
    #[error("configuration directory not found")]
    NoConfigDir,
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Host display settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Pixels represented by one terminal column.
    pub cell_width: f32,
    /// Pixels represented by one terminal row.
    pub cell_height: f32,
    /// Force low-power mode on or off. Detected from the machine when unset.
    pub low_power: Option<bool>,
    /// Fixed random seed for reproducible petal fields.
    pub seed: Option<u64>,
    /// Duration of an eased page scroll.
    pub smooth_scroll_ms: u64,
    /// Duration of an eased page scroll in the mobile size class.
    pub mobile_smooth_scroll_ms: u64,
    /// Idle time after the last scroll event before scrolling ends.
    pub scroll_settle_ms: u64,
    pub mobile_scroll_settle_ms: u64,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            cell_width: 8.0,
            cell_height: 16.0,
            low_power: None,
            seed: None,
            smooth_scroll_ms: 600,
            mobile_smooth_scroll_ms: 300,
            scroll_settle_ms: 150,
            mobile_scroll_settle_ms: 300,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Petal field tunables.
    pub field: FieldConfig,
    /// Terminal host settings.
    pub display: DisplayConfig,
}

impl AppConfig {
    /// Default location of the configuration file.
    pub fn default_path() -> Result<PathBuf> {
        ProjectDirs::from("", "", "sakura")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Load from the default location, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        let path = Self::default_path()?;
        Self::load_or_default(&path)
    }

    /// Load from `path`, or return defaults when it does not exist.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("no configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(path)
    }

    /// Load from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = toml::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Write to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let text = toml::to_string_pretty(self)?;
        fs::write(path, text).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
