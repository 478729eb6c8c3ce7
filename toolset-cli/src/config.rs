///! CLI configuration management
///!
///! Settings live in `$HOME/.config/toolset/cli.toml`. Environment variables
///! override the file, and command-line flags override both.

use crate::logging::LogRotation;
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use toolset_common::RefreshConfig;

/// Simulated duration of the refresh action's work
pub const DEFAULT_WORK_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub default_output: String,
    pub work_ms: u64,
    pub refresh: RefreshConfig,
    pub logging: LogSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    /// Directory for rolling log files; console only when unset
    pub directory: Option<PathBuf>,
    pub rotation: LogRotation,
    pub json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_output: "table".to_string(),
            work_ms: DEFAULT_WORK_MS,
            refresh: RefreshConfig::default(),
            logging: LogSettings::default(),
        }
    }
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            directory: None,
            rotation: LogRotation::Daily,
            json: false,
        }
    }
}

impl Config {
    /// Loads the config file (defaults when missing) and applies environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_file()?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Loads the config file as written, without environment overrides
    pub fn load_file() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(config_path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: Config = toml::from_str(contents)?;
        config.refresh.validate()?;
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(config_path, contents)?;

        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME")?;
        Ok(PathBuf::from(home).join(".config/toolset/cli.toml"))
    }

    fn apply_env_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(threshold) = var("TOOLSET_THRESHOLD") {
            match threshold.parse() {
                Ok(threshold) => self.refresh.threshold = threshold,
                Err(_) => tracing::warn!(%threshold, "Ignoring unparsable TOOLSET_THRESHOLD"),
            }
        }
        if let Some(level) = var("TOOLSET_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(directory) = var("TOOLSET_LOG_DIR") {
            self.logging.directory = Some(PathBuf::from(directory));
        }
    }
}
