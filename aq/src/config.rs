//! admitq configuration types and loading

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::service::ServiceConfig;

/// Project-local config file name
pub const LOCAL_CONFIG_FILE: &str = ".admitq.yml";

/// Main admitq configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[serde(rename = "log-level")]
    pub log_level: Option<String>,

    /// Automatic service loop
    pub service: ServiceConfig,

    /// Interactive session
    pub repl: ReplConfig,
}

impl Config {
    /// Load configuration with fallback chain
    ///
    /// An explicit path must load; implicit locations that fail to parse are
    /// skipped with a warning.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        for candidate in Self::implicit_paths() {
            if !candidate.exists() {
                continue;
            }
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    tracing::warn!("Failed to load config from {}: {}", candidate.display(), e);
                }
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Peek at the configured log level before logging is initialized
    pub fn load_log_level(config_path: Option<&PathBuf>) -> Option<String> {
        match config_path {
            Some(path) => Self::load_from_file(path).ok()?.log_level,
            None => Self::implicit_paths()
                .into_iter()
                .filter(|p| p.exists())
                .find_map(|p| Self::load_from_file(&p).ok())?
                .log_level,
        }
    }

    /// `./.admitq.yml`, then `<config_dir>/admitq/admitq.yml`
    fn implicit_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("admitq").join("admitq.yml"));
        }
        paths
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        tracing::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

/// Interactive session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReplConfig {
    /// Prompt shown before each command
    pub prompt: String,

    /// Keep an in-memory line history
    pub history: bool,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: ">>".to_string(),
            history: true,
        }
    }
}
