//! Logging setup.
//!
//! Installs the global `tracing` subscriber: human-readable output on
//! stderr plus, optionally, a daily rolling file written off-thread by
//! `tracing-appender`. `RUST_LOG` overrides the configured level.

use std::path::PathBuf;

use thiserror::Error;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::time::LocalTime;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::ConfigFile;

/// Default log file name prefix; files are suffixed with the date.
pub const DEFAULT_LOG_FILE_PREFIX: &str = "tabhost.log";

/// Errors setting up logging.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Invalid log filter '{filter}': {message}")]
    InvalidFilter { filter: String, message: String },

    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset (e.g. `info`, `tabhost=debug`).
    pub level: String,

    /// Directory for the rolling log file. `None` logs to stderr only.
    pub directory: Option<PathBuf>,

    pub file_prefix: String,

    /// Colored stderr output.
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: DEFAULT_LOG_FILE_PREFIX.to_string(),
            ansi: true,
        }
    }
}

impl LoggingConfig {
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    /// Also write a daily rolling file into `directory`.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = Some(directory.into());
        self
    }

    pub fn with_ansi(mut self, ansi: bool) -> Self {
        self.ansi = ansi;
        self
    }

    /// Logging settings from the `[logging]` section.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        let base = Self::default().with_level(config.logging.level.clone());
        if config.logging.file {
            base.with_directory(config.logging.directory.clone())
        } else {
            base
        }
    }

    /// Filter for this configuration, honoring `RUST_LOG` first.
    pub fn env_filter(&self) -> Result<EnvFilter, LoggingError> {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return Ok(filter);
        }
        EnvFilter::try_new(&self.level).map_err(|e| LoggingError::InvalidFilter {
            filter: self.level.clone(),
            message: e.to_string(),
        })
    }
}

/// Keeps the background log writer alive. Drop it last; pending file
/// output is flushed when it goes.
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
    log_file_dir: Option<PathBuf>,
}

impl LoggingGuard {
    /// Directory of the rolling log file, if file logging is on.
    pub fn log_file_dir(&self) -> Option<&PathBuf> {
        self.log_file_dir.as_ref()
    }
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the filter does not parse, the log directory cannot be
/// created, or a global subscriber is already installed.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, LoggingError> {
    let filter = config.env_filter()?;

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_timer(LocalTime::rfc_3339())
        .with_target(false)
        .with_ansi(config.ansi);

    let (file_layer, file_guard) = match &config.directory {
        Some(directory) => {
            std::fs::create_dir_all(directory).map_err(|source| LoggingError::CreateDir {
                path: directory.clone(),
                source,
            })?;
            let appender = tracing_appender::rolling::daily(directory, &config.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_timer(LocalTime::rfc_3339())
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
        log_file_dir: config.directory.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "info");
        assert!(config.directory.is_none());
        assert_eq!(config.file_prefix, DEFAULT_LOG_FILE_PREFIX);
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.logging.level = "debug".to_string();
        file.logging.file = false;

        let config = LoggingConfig::from_config_file(&file);
        assert_eq!(config.level, "debug");
        assert!(config.directory.is_none());

        file.logging.file = true;
        let config = LoggingConfig::from_config_file(&file);
        assert_eq!(config.directory, Some(file.logging.directory.clone()));
    }

    #[test]
    fn test_init_creates_directory_and_rejects_second_init() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("logs");
        let config = LoggingConfig::default()
            .with_ansi(false)
            .with_directory(&dir);

        let guard = init_logging(&config).unwrap();
        assert!(dir.is_dir());
        assert_eq!(guard.log_file_dir(), Some(&dir));

        assert!(matches!(
            init_logging(&LoggingConfig::default()),
            Err(LoggingError::AlreadyInitialized(_))
        ));
    }
}
