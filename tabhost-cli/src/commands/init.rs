//! Init command - write the configuration file and create the profile.

use std::fs;

use tabhost::config::{config_file_path, ConfigFile};
use tabhost::store::LOCK_FILE_NAME;

use crate::error::CliError;

/// Run the init command.
///
/// Existing settings are kept; only missing keys are filled with defaults.
pub fn run() -> Result<(), CliError> {
    let path = config_file_path();
    let existed = path.exists();

    let config = match ConfigFile::load() {
        Ok(config) => config,
        Err(e) if existed => return Err(e.into()),
        Err(_) => ConfigFile::default(),
    };
    config.save()?;

    let profile_dir = &config.profile.directory;
    fs::create_dir_all(profile_dir).map_err(|e| {
        CliError::Config(format!(
            "Failed to create profile directory {}: {}",
            profile_dir.display(),
            e
        ))
    })?;

    if existed {
        println!("Updated configuration file: {}", path.display());
    } else {
        println!("Created configuration file: {}", path.display());
    }
    println!("Profile directory:          {}", profile_dir.display());
    if profile_dir.join(LOCK_FILE_NAME).exists() {
        println!();
        println!("Note: the profile is locked; another instance may be running.");
    }
    println!();
    println!("Edit this file to customize TabHost settings.");
    println!("Use 'tabhost config list' to see all keys.");
    Ok(())
}
