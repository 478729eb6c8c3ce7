///! Logging configuration module
///! Console output on stderr, plus an optional rolling log file

use crate::config::LogSettings;
use serde::{Deserialize, Serialize};
use std::io;
use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const LOG_FILE_PREFIX: &str = "toolset.log";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub directory: Option<PathBuf>,
    pub rotation: LogRotation,
    pub json_format: bool,
}

/// Log rotation policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            directory: None,
            rotation: LogRotation::Daily,
            json_format: false,
        }
    }
}

impl From<&LogSettings> for LoggingConfig {
    fn from(settings: &LogSettings) -> Self {
        Self {
            level: settings.level.clone(),
            directory: settings.directory.clone(),
            rotation: settings.rotation,
            json_format: settings.json,
        }
    }
}

impl LoggingConfig {
    /// Installs the global subscriber. `RUST_LOG` takes precedence over the
    /// configured level.
    ///
    /// The returned guard flushes the file writer and must be held until exit.
    pub fn init(&self) -> anyhow::Result<Option<WorkerGuard>> {
        let env_filter =
            EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&self.level))?;

        let console_layer = if self.json_format {
            fmt::layer().json().with_writer(io::stderr).boxed()
        } else {
            fmt::layer()
                .with_target(true)
                .with_level(true)
                .with_ansi(true)
                .with_writer(io::stderr)
                .boxed()
        };

        let Some(ref directory) = self.directory else {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(console_layer)
                .try_init()?;
            return Ok(None);
        };

        let file_appender = match self.rotation {
            LogRotation::Hourly => rolling::hourly(directory, LOG_FILE_PREFIX),
            LogRotation::Daily => rolling::daily(directory, LOG_FILE_PREFIX),
            LogRotation::Never => rolling::never(directory, LOG_FILE_PREFIX),
        };
        let (writer, guard) = non_blocking(file_appender);

        let file_layer = fmt::layer()
            .with_target(true)
            .with_ansi(false)
            .json()
            .with_writer(writer);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(console_layer)
            .with(file_layer)
            .try_init()?;

        tracing::debug!(directory = %directory.display(), "File logging enabled");
        Ok(Some(guard))
    }
}
