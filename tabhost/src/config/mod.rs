//! Persistent configuration.
//!
//! Settings live in an INI file at `~/.tabhost/config.ini`. A missing file
//! means defaults; `tabhost init` writes one out. Individual settings are
//! addressed as `section.key` through [`ConfigKey`], which backs the CLI's
//! `config get/set/list` commands.
//!
//! ```ini
//! [launch]
//! schemes = tabhost,tabhost-x-callback
//!
//! [background]
//! budget_secs = 30
//!
//! [sync]
//! account = true
//! duration_ms = 2000
//! fail = false
//!
//! [profile]
//! directory = ~/.tabhost/profile
//!
//! [logging]
//! level = info
//! file = true
//! directory = ~/.tabhost/logs
//! ```

mod file;
mod keys;

pub use file::{
    config_dir, config_file_path, BackgroundSettings, ConfigFile, ConfigFileError,
    LaunchSettings, LoggingSettings, ProfileSettings, SyncSettings, CONFIG_FILE_NAME,
};
pub use keys::ConfigKey;
