//! Settings for the `ctxconf` command-line tool

use crate::types::{ConfigError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub log_level: Option<String>,
    /// Pretty-print JSON output
    pub pretty: bool,
    /// Base layers placed below the documents given on the command line.
    /// Relative paths resolve against the settings file's directory.
    pub layers: Vec<PathBuf>,
}

impl Settings {
    /// Candidate settings files in priority order:
    /// 1. ./.ctxconf.toml (project-specific)
    /// 2. $CTXCONF_CONFIG (environment variable)
    /// 3. ~/.config/ctxconf/config.toml (user-global)
    pub fn candidates() -> Vec<PathBuf> {
        let mut candidates = Vec::new();

        if let Ok(cwd) = std::env::current_dir() {
            candidates.push(cwd.join(".ctxconf.toml"));
        }

        if let Ok(config_path) = std::env::var("CTXCONF_CONFIG") {
            candidates.push(PathBuf::from(config_path));
        }

        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join("ctxconf").join("config.toml"));
        }

        candidates
    }

    /// Load the first settings file that exists, or defaults when none does
    pub fn discover() -> Result<Self> {
        for path in Self::candidates() {
            if path.exists() {
                return Self::from_path(&path);
            }
        }
        debug!("No settings file found");
        Ok(Self::default())
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!("Loading settings from: {}", path.display());
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Load(format!("Failed to read settings: {}", e)))?;
        let mut settings: Settings = toml::from_str(&content)
            .map_err(|e| ConfigError::Load(format!("Failed to parse settings: {}", e)))?;

        if let Some(dir) = path.parent() {
            for layer in &mut settings.layers {
                if layer.is_relative() {
                    *layer = dir.join(&*layer);
                }
            }
        }
        Ok(settings)
    }
}
