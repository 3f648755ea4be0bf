//! INI configuration file.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::budget::DEFAULT_BUDGET_SECS;
use crate::launch::DEFAULT_SCHEMES;
use crate::sync::DEFAULT_SIMULATED_SYNC_MS;

/// File name inside [`config_dir`].
pub const CONFIG_FILE_NAME: &str = "config.ini";

/// Errors loading or saving the configuration file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    #[error("Failed to read config file {path}: {message}")]
    Read { path: PathBuf, message: String },

    #[error("Failed to write config file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },
}

/// `~/.tabhost`, or `./.tabhost` when no home directory is known.
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".tabhost")
}

/// Path of the default configuration file.
pub fn config_file_path() -> PathBuf {
    config_dir().join(CONFIG_FILE_NAME)
}

/// `[launch]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSettings {
    pub schemes: Vec<String>,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// `[background]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackgroundSettings {
    pub budget_secs: u64,
}

impl Default for BackgroundSettings {
    fn default() -> Self {
        Self {
            budget_secs: DEFAULT_BUDGET_SECS,
        }
    }
}

/// `[sync]`: the simulated sync engine used by the CLI host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    pub account: bool,
    pub duration_ms: u64,
    pub fail: bool,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            account: true,
            duration_ms: DEFAULT_SIMULATED_SYNC_MS,
            fail: false,
        }
    }
}

/// `[profile]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileSettings {
    pub directory: PathBuf,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            directory: config_dir().join("profile"),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: bool,
    pub directory: PathBuf,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: true,
            directory: config_dir().join("logs"),
        }
    }
}

/// Contents of `config.ini`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigFile {
    pub launch: LaunchSettings,
    pub background: BackgroundSettings,
    pub sync: SyncSettings,
    pub profile: ProfileSettings,
    pub logging: LoggingSettings,
}

impl ConfigFile {
    /// Load the default configuration file, or defaults if it does not exist.
    pub fn load() -> Result<Self, ConfigFileError> {
        Self::load_from(&config_file_path())
    }

    /// Load from `path`, or defaults if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigFileError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path).map_err(|e| ConfigFileError::Read {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    /// Parse INI text. Missing keys keep their defaults.
    pub fn parse(text: &str) -> Result<Self, ConfigFileError> {
        let ini = Ini::load_from_str(text).map_err(|e| ConfigFileError::Read {
            path: PathBuf::from("<string>"),
            message: e.to_string(),
        })?;
        Self::from_ini(&ini)
    }

    fn from_ini(ini: &Ini) -> Result<Self, ConfigFileError> {
        let mut config = Self::default();

        if let Some(value) = ini.get_from(Some("launch"), "schemes") {
            config.launch.schemes = parse_list(value);
        }
        if let Some(value) = ini.get_from(Some("background"), "budget_secs") {
            config.background.budget_secs = parse_value("background.budget_secs", value)?;
        }
        if let Some(value) = ini.get_from(Some("sync"), "account") {
            config.sync.account = parse_bool("sync.account", value)?;
        }
        if let Some(value) = ini.get_from(Some("sync"), "duration_ms") {
            config.sync.duration_ms = parse_value("sync.duration_ms", value)?;
        }
        if let Some(value) = ini.get_from(Some("sync"), "fail") {
            config.sync.fail = parse_bool("sync.fail", value)?;
        }
        if let Some(value) = ini.get_from(Some("profile"), "directory") {
            config.profile.directory = expand_tilde(value);
        }
        if let Some(value) = ini.get_from(Some("logging"), "level") {
            config.logging.level = value.trim().to_string();
        }
        if let Some(value) = ini.get_from(Some("logging"), "file") {
            config.logging.file = parse_bool("logging.file", value)?;
        }
        if let Some(value) = ini.get_from(Some("logging"), "directory") {
            config.logging.directory = expand_tilde(value);
        }

        Ok(config)
    }

    fn to_ini(&self) -> Ini {
        let mut ini = Ini::new();
        ini.with_section(Some("launch"))
            .set("schemes", self.launch.schemes.join(","));
        ini.with_section(Some("background"))
            .set("budget_secs", self.background.budget_secs.to_string());
        ini.with_section(Some("sync"))
            .set("account", self.sync.account.to_string())
            .set("duration_ms", self.sync.duration_ms.to_string())
            .set("fail", self.sync.fail.to_string());
        ini.with_section(Some("profile"))
            .set("directory", self.profile.directory.to_string_lossy());
        ini.with_section(Some("logging"))
            .set("level", self.logging.level.as_str())
            .set("file", self.logging.file.to_string())
            .set("directory", self.logging.directory.to_string_lossy());
        ini
    }

    /// Write to the default configuration file, creating its directory.
    pub fn save(&self) -> Result<(), ConfigFileError> {
        self.save_to(&config_file_path())
    }

    /// Write to `path`, creating its parent directory.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigFileError> {
        let write_err = |source| ConfigFileError::Write {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(write_err)?;
        }
        self.to_ini().write_to_file(path).map_err(write_err)
    }
}

pub(crate) fn parse_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub(crate) fn parse_value<T>(key: &str, value: &str) -> Result<T, ConfigFileError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigFileError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

pub(crate) fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigFileError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" | "on" => Ok(true),
        "false" | "no" | "0" | "off" => Ok(false),
        _ => Err(ConfigFileError::InvalidValue {
            key: key.to_string(),
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}

pub(crate) fn expand_tilde(value: &str) -> PathBuf {
    let value = value.trim();
    match (value.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let temp = TempDir::new().unwrap();
        let config = ConfigFile::load_from(&temp.path().join("config.ini")).unwrap();
        assert_eq!(config, ConfigFile::default());
        assert_eq!(config.background.budget_secs, DEFAULT_BUDGET_SECS);
    }

    #[test]
    fn test_parse_partial_file() {
        let config = ConfigFile::parse(
            "[launch]\nschemes = beta, tabhost\n\n[sync]\naccount = no\nduration_ms = 50\n",
        )
        .unwrap();

        assert_eq!(config.launch.schemes, vec!["beta", "tabhost"]);
        assert!(!config.sync.account);
        assert_eq!(config.sync.duration_ms, 50);
        assert!(!config.sync.fail);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_parse_invalid_value() {
        let err = ConfigFile::parse("[background]\nbudget_secs = soon\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigFileError::InvalidValue { ref key, .. } if key == "background.budget_secs"
        ));

        assert!(ConfigFile::parse("[logging]\nfile = maybe\n").is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("config.ini");

        let mut config = ConfigFile::default();
        config.background.budget_secs = 5;
        config.profile.directory = temp.path().join("profile");
        config.save_to(&path).unwrap();

        assert_eq!(ConfigFile::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_expand_tilde() {
        assert_eq!(expand_tilde("/var/tabhost"), PathBuf::from("/var/tabhost"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_tilde("~/profile"), home.join("profile"));
        }
    }
}
