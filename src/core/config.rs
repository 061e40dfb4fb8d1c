//! Configuration loading
//!
//! Configuration is plain YAML. Sources are checked in order and the last one
//! found wins as a whole file:
//!
//! 1. built-in defaults
//! 2. `<user config dir>/spcgen/config.yaml`
//! 3. `./.spcgen.yaml`
//! 4. an explicit `--config` path (must exist)

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".spcgen.yaml";

/// Errors raised while reading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config {}: {message}", path.display())]
    Parse { path: PathBuf, message: String },
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Dataset generation settings
    pub dataset: DatasetConfig,

    /// CLI output defaults
    pub output: OutputConfig,
}

/// Enumerations and ranges used by the record synthesizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub facilities: Vec<String>,
    pub generation_nodes: Vec<String>,
    pub metrology_equipment: Vec<String>,
    pub products: Vec<String>,
    pub process_equipment: Vec<String>,

    /// Inclusive range the process target is drawn from
    pub target_range: [f64; 2],

    /// Inclusive range the process variation is drawn from (must stay > 0)
    pub variation_range: [f64; 2],

    /// First timestamp a record may carry
    pub window_start: NaiveDateTime,

    /// Last timestamp a record may carry
    pub window_end: NaiveDateTime,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn midnight(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            facilities: strings(&["fab1", "fab2"]),
            generation_nodes: strings(&["g1", "g2", "g3"]),
            metrology_equipment: strings(&["MET1-CHA", "MET2-CHB", "MET3-ACC"]),
            products: strings(&["A100", "A200", "B500", "C300", "D700"]),
            process_equipment: strings(&["EQP-001", "EQP-002", "EQP-101", "EQP-201", "EQP-202"]),
            target_range: [95.0, 105.0],
            variation_range: [1.5, 3.0],
            window_start: midnight(2025, 6, 1),
            window_end: midnight(2025, 6, 30),
        }
    }
}

/// Defaults applied by the command-line front end
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Default output format name (e.g. "json", "table")
    pub format: Option<String>,

    /// Records generated when `--count` is not given
    pub default_count: i64,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: None,
            default_count: 100,
        }
    }
}

impl Config {
    /// Load configuration from the implicit locations
    ///
    /// Unreadable or malformed implicit files are skipped with a warning so a
    /// stray file never blocks generation.
    pub fn load() -> Self {
        for path in Self::implicit_paths().into_iter().rev() {
            if !path.exists() {
                continue;
            }
            match Self::load_from(&path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("ignoring config: {}", e),
            }
        }
        debug!("using built-in configuration");
        Self::default()
    }

    /// Load configuration, preferring an explicit path when one is given
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load_from(path),
            None => Ok(Self::load()),
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::parse(&content, path)?;
        debug!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    /// Parse YAML content; `path` is only used for error messages
    pub fn parse(content: &str, path: &Path) -> Result<Self, ConfigError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yml::from_str(content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the per-user config file, if a home directory is known
    pub fn user_config_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "spcgen").map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Implicit config locations, lowest precedence first
    fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(user) = Self::user_config_path() {
            paths.push(user);
        }
        paths.push(PathBuf::from(LOCAL_CONFIG_FILE));
        paths
    }
}
