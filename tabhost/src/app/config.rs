//! Application configuration for TabHostApp.
//!
//! `AppConfig` combines the component configs needed to bootstrap the
//! application. The CLI builds it from `config.ini`; embedders build it
//! directly.

use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use super::AppError;
use crate::budget::BudgetConfig;
use crate::config::{config_dir, ConfigFile};
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::launch::LaunchConfig;
use crate::log::LoggingConfig;
use crate::sync::SimulatedSyncConfig;

/// Application configuration combining all component configs.
///
/// This is the top-level configuration passed to `TabHostApp::start()`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Registered URL schemes.
    pub launch: LaunchConfig,

    /// Background budget length, used when no budget is injected.
    pub budget: BudgetConfig,

    /// Simulated sync behavior for hosts without a real sync engine.
    pub sync: SimulatedSyncConfig,

    /// Profile directory for the default store.
    pub profile_dir: PathBuf,

    pub logging: LoggingConfig,

    /// Lifecycle event channel capacity.
    pub event_capacity: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            launch: LaunchConfig::default(),
            budget: BudgetConfig::default(),
            sync: SimulatedSyncConfig::default(),
            profile_dir: config_dir().join("profile"),
            logging: LoggingConfig::default(),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl AppConfig {
    /// Create application config from the configuration file.
    ///
    /// Keeps the translation from file settings to component configs in one
    /// place rather than scattered in CLI code.
    pub fn from_config_file(config: &ConfigFile) -> Self {
        Self {
            launch: LaunchConfig::default().with_schemes(config.launch.schemes.iter().cloned()),
            budget: BudgetConfig::default()
                .with_duration(Duration::from_secs(config.background.budget_secs)),
            sync: SimulatedSyncConfig::default()
                .with_account(config.sync.account)
                .with_duration(Duration::from_millis(config.sync.duration_ms))
                .with_failure(config.sync.fail),
            profile_dir: config.profile.directory.clone(),
            logging: LoggingConfig::from_config_file(config),
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Check the settings a running app depends on.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Config`] naming the first offending setting.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.launch.schemes.is_empty() {
            return Err(AppError::Config(
                "at least one launch scheme must be registered".to_string(),
            ));
        }
        if let Some(scheme) = self.launch.schemes.iter().find(|s| !is_valid_scheme(s)) {
            return Err(AppError::Config(format!(
                "'{}' is not a valid URL scheme",
                scheme
            )));
        }
        if self.budget.duration.is_zero() {
            return Err(AppError::Config(
                "background budget must be longer than zero".to_string(),
            ));
        }
        if let Err(e) = EnvFilter::try_new(&self.logging.level) {
            return Err(AppError::Config(format!(
                "invalid log level '{}': {}",
                self.logging.level, e
            )));
        }
        Ok(())
    }

    /// Set the profile directory.
    pub fn with_profile_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.profile_dir = dir.into();
        self
    }

    /// Set the background budget length.
    pub fn with_budget_duration(mut self, duration: Duration) -> Self {
        self.budget = self.budget.with_duration(duration);
        self
    }

    /// Set the simulated sync behavior.
    pub fn with_sync(mut self, sync: SimulatedSyncConfig) -> Self {
        self.sync = sync;
        self
    }
}

/// `ALPHA *( ALPHA / DIGIT / "+" / "-" / "." )`
fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(AppConfig::default().validate().is_ok());

        let mut config = AppConfig::default();
        config.launch.schemes.clear();
        assert!(matches!(config.validate(), Err(AppError::Config(_))));

        let mut config = AppConfig::default();
        config.launch.schemes = vec!["tabhost".to_string(), "2fast".to_string()];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("'2fast'"));

        let config = AppConfig::default().with_budget_duration(Duration::ZERO);
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.logging = config.logging.with_level("tabhost=shouty");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheme_syntax() {
        assert!(is_valid_scheme("tabhost-x-callback"));
        assert!(is_valid_scheme("web+tabhost"));
        assert!(!is_valid_scheme(""));
        assert!(!is_valid_scheme("tab host"));
        assert!(!is_valid_scheme("-tabhost"));
    }

    #[test]
    fn test_from_config_file() {
        let mut file = ConfigFile::default();
        file.launch.schemes = vec!["beta".to_string()];
        file.background.budget_secs = 3;
        file.sync.account = false;
        file.sync.duration_ms = 10;
        file.profile.directory = PathBuf::from("/tmp/profile");

        let config = AppConfig::from_config_file(&file);

        assert!(config.launch.accepts_scheme("beta"));
        assert!(!config.launch.accepts_scheme("tabhost"));
        assert_eq!(config.budget.duration, Duration::from_secs(3));
        assert!(!config.sync.has_account);
        assert_eq!(config.sync.duration, Duration::from_millis(10));
        assert_eq!(config.profile_dir, PathBuf::from("/tmp/profile"));
    }

    #[test]
    fn test_builders() {
        let config = AppConfig::default()
            .with_profile_dir("/data/profile")
            .with_budget_duration(Duration::from_millis(100))
            .with_sync(SimulatedSyncConfig::default().with_failure(true));

        assert_eq!(config.profile_dir, PathBuf::from("/data/profile"));
        assert_eq!(config.budget.duration, Duration::from_millis(100));
        assert!(config.sync.fail);
    }
}
