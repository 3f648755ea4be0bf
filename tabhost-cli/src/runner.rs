//! Shared setup for commands that run the coordinator.

use tracing::{info, warn};

use tabhost::app::AppConfig;
use tabhost::config::{config_file_path, ConfigFile};
use tabhost::log::{init_logging, LoggingConfig, LoggingGuard};

use crate::error::CliError;

/// Loaded configuration plus the logging guard.
///
/// Keep the runner alive for the whole command; dropping it flushes and
/// stops file logging.
pub struct CliRunner {
    config: ConfigFile,
    _logging: LoggingGuard,
}

impl CliRunner {
    /// Load `config.ini` and start logging.
    ///
    /// `verbose` raises the level to `debug` unless `RUST_LOG` says otherwise.
    pub fn new(verbose: bool) -> Result<Self, CliError> {
        let (config, load_error) = match ConfigFile::load() {
            Ok(config) => (config, None),
            Err(e) => (ConfigFile::default(), Some(e)),
        };

        let mut logging = LoggingConfig::from_config_file(&config)
            .with_ansi(console::colors_enabled_stderr());
        if verbose {
            logging = logging.with_level("debug");
        }
        let guard = init_logging(&logging)?;

        if let Some(e) = load_error {
            warn!(error = %e, "Using default configuration");
        }

        Ok(Self {
            config,
            _logging: guard,
        })
    }

    pub fn config(&self) -> &ConfigFile {
        &self.config
    }

    /// Application config derived from the loaded file.
    pub fn app_config(&self) -> AppConfig {
        AppConfig::from_config_file(&self.config)
    }

    pub fn log_startup(&self, command: &str) {
        info!(
            version = tabhost::VERSION,
            command,
            config = %config_file_path().display(),
            "tabhost starting"
        );
    }
}
