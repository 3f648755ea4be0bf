//! `section.key` addressing for individual settings.

use std::fmt;
use std::str::FromStr;

use super::file::{expand_tilde, parse_bool, parse_list, parse_value, ConfigFile, ConfigFileError};

/// One addressable setting in `config.ini`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigKey {
    LaunchSchemes,
    BackgroundBudgetSecs,
    SyncAccount,
    SyncDurationMs,
    SyncFail,
    ProfileDirectory,
    LoggingLevel,
    LoggingFile,
    LoggingDirectory,
}

impl ConfigKey {
    /// Every key, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::LaunchSchemes,
            ConfigKey::BackgroundBudgetSecs,
            ConfigKey::SyncAccount,
            ConfigKey::SyncDurationMs,
            ConfigKey::SyncFail,
            ConfigKey::ProfileDirectory,
            ConfigKey::LoggingLevel,
            ConfigKey::LoggingFile,
            ConfigKey::LoggingDirectory,
        ]
    }

    /// Full `section.key` name.
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::LaunchSchemes => "launch.schemes",
            ConfigKey::BackgroundBudgetSecs => "background.budget_secs",
            ConfigKey::SyncAccount => "sync.account",
            ConfigKey::SyncDurationMs => "sync.duration_ms",
            ConfigKey::SyncFail => "sync.fail",
            ConfigKey::ProfileDirectory => "profile.directory",
            ConfigKey::LoggingLevel => "logging.level",
            ConfigKey::LoggingFile => "logging.file",
            ConfigKey::LoggingDirectory => "logging.directory",
        }
    }

    pub fn section(&self) -> &'static str {
        self.name().split_once('.').map(|(s, _)| s).unwrap_or("")
    }

    pub fn key_name(&self) -> &'static str {
        self.name().split_once('.').map(|(_, k)| k).unwrap_or("")
    }

    /// Current value, formatted as it would appear in the file.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::LaunchSchemes => config.launch.schemes.join(","),
            ConfigKey::BackgroundBudgetSecs => config.background.budget_secs.to_string(),
            ConfigKey::SyncAccount => config.sync.account.to_string(),
            ConfigKey::SyncDurationMs => config.sync.duration_ms.to_string(),
            ConfigKey::SyncFail => config.sync.fail.to_string(),
            ConfigKey::ProfileDirectory => config.profile.directory.display().to_string(),
            ConfigKey::LoggingLevel => config.logging.level.clone(),
            ConfigKey::LoggingFile => config.logging.file.to_string(),
            ConfigKey::LoggingDirectory => config.logging.directory.display().to_string(),
        }
    }

    /// Validate and store `value`.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigFileError> {
        let key = self.name();
        match self {
            ConfigKey::LaunchSchemes => {
                let schemes = parse_list(value);
                if schemes.is_empty() {
                    return Err(ConfigFileError::InvalidValue {
                        key: key.to_string(),
                        value: value.to_string(),
                        reason: "at least one scheme is required".to_string(),
                    });
                }
                config.launch.schemes = schemes;
            }
            ConfigKey::BackgroundBudgetSecs => {
                config.background.budget_secs = parse_value(key, value)?;
            }
            ConfigKey::SyncAccount => config.sync.account = parse_bool(key, value)?,
            ConfigKey::SyncDurationMs => config.sync.duration_ms = parse_value(key, value)?,
            ConfigKey::SyncFail => config.sync.fail = parse_bool(key, value)?,
            ConfigKey::ProfileDirectory => config.profile.directory = expand_tilde(value),
            ConfigKey::LoggingLevel => config.logging.level = value.trim().to_string(),
            ConfigKey::LoggingFile => config.logging.file = parse_bool(key, value)?,
            ConfigKey::LoggingDirectory => config.logging.directory = expand_tilde(value),
        }
        Ok(())
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| format!("Unknown configuration key '{}'", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_parse_back() {
        for key in ConfigKey::all() {
            assert_eq!(key.name().parse::<ConfigKey>().unwrap(), *key);
            assert_eq!(format!("{}.{}", key.section(), key.key_name()), key.name());
        }
        assert!("launch.colour".parse::<ConfigKey>().is_err());
    }

    #[test]
    fn test_set_and_get() {
        let mut config = ConfigFile::default();

        ConfigKey::BackgroundBudgetSecs.set(&mut config, "12").unwrap();
        assert_eq!(ConfigKey::BackgroundBudgetSecs.get(&config), "12");

        ConfigKey::LaunchSchemes.set(&mut config, "a, b").unwrap();
        assert_eq!(config.launch.schemes, vec!["a", "b"]);

        ConfigKey::SyncAccount.set(&mut config, "off").unwrap();
        assert!(!config.sync.account);
    }

    #[test]
    fn test_set_rejects_invalid() {
        let mut config = ConfigFile::default();
        assert!(ConfigKey::SyncDurationMs.set(&mut config, "-1").is_err());
        assert!(ConfigKey::LaunchSchemes.set(&mut config, " , ").is_err());
        assert_eq!(config, ConfigFile::default());
    }
}
