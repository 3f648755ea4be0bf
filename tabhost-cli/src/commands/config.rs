//! `tabhost config` - inspect and edit `config.ini`.
//!
//! Writes parse the value with [`ConfigKey::set`] and then check the whole
//! file with [`AppConfig::validate`], so a setting the app would refuse at
//! startup never reaches disk.

use std::path::Path;

use clap::Subcommand;
use tabhost::app::AppConfig;
use tabhost::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print one setting
    Get {
        /// Setting name, e.g. background.budget_secs
        key: String,
    },

    /// Change one setting
    Set {
        /// Setting name, e.g. launch.schemes
        key: String,

        /// New value; lists are comma separated
        value: String,
    },

    /// Restore one setting to its default
    Reset {
        /// Setting name
        key: String,
    },

    /// Show every setting, grouped by section, with defaults
    List {
        /// Only show settings that differ from the defaults
        #[arg(long)]
        changed: bool,
    },

    /// Show the configuration file path
    Path,
}

pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    let path = config_file_path();
    match command {
        ConfigCommands::Get { key } => {
            let key = parse_key(&key)?;
            let config = ConfigFile::load_from(&path)?;
            println!("{}", key.get(&config));
        }
        ConfigCommands::Set { key, value } => {
            let key = parse_key(&key)?;
            let stored = update(&path, key, |config| key.set(config, &value))?;
            println!("{} = {}", key, stored);
        }
        ConfigCommands::Reset { key } => {
            let key = parse_key(&key)?;
            let default = key.get(&ConfigFile::default());
            let stored = update(&path, key, |config| key.set(config, &default))?;
            println!("{} = {} (default)", key, stored);
        }
        ConfigCommands::List { changed } => {
            let config = ConfigFile::load_from(&path)?;
            let lines = list_lines(&config, changed);
            if lines.is_empty() {
                println!("All settings are at their defaults.");
            }
            for line in lines {
                println!("{}", line);
            }
        }
        ConfigCommands::Path => {
            if path.exists() {
                println!("{}", path.display());
            } else {
                println!("{} (not created yet; run 'tabhost init')", path.display());
            }
        }
    }
    Ok(())
}

fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        let known: Vec<_> = ConfigKey::all().iter().map(ConfigKey::name).collect();
        CliError::Config(format!(
            "Unknown setting '{}'. Known settings: {}",
            key,
            known.join(", ")
        ))
    })
}

/// Apply `change`, validate the result as an app configuration, then save.
///
/// Returns the stored value of `key`. The file is left untouched on error.
fn update<F>(path: &Path, key: ConfigKey, change: F) -> Result<String, CliError>
where
    F: FnOnce(&mut ConfigFile) -> Result<(), tabhost::config::ConfigFileError>,
{
    let mut config = ConfigFile::load_from(path)?;
    change(&mut config)?;
    AppConfig::from_config_file(&config)
        .validate()
        .map_err(|e| CliError::Config(format!("Not saving {}: {}", key, e)))?;
    config.save_to(path)?;
    Ok(key.get(&config))
}

/// `[section]` headers followed by `  key = value` lines. Values that differ
/// from the default carry the default alongside.
fn list_lines(config: &ConfigFile, changed_only: bool) -> Vec<String> {
    let defaults = ConfigFile::default();
    let mut lines = Vec::new();
    let mut section = "";

    for key in ConfigKey::all() {
        let value = key.get(config);
        let default = key.get(&defaults);
        if changed_only && value == default {
            continue;
        }

        if key.section() != section {
            if !lines.is_empty() {
                lines.push(String::new());
            }
            section = key.section();
            lines.push(format!("[{}]", section));
        }

        if value == default {
            lines.push(format!("  {} = {}", key.key_name(), value));
        } else {
            lines.push(format!(
                "  {} = {}  (default: {})",
                key.key_name(),
                value,
                default
            ));
        }
    }
    lines
}
