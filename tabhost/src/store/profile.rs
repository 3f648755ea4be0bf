//! Directory-backed profile store.

use std::fs;
use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use tracing::{info, warn};

use super::{PersistentStore, StoreError};

/// Name of the marker file present while the profile is open.
pub const LOCK_FILE_NAME: &str = "profile.lock";

/// Profile store rooted at a directory.
///
/// An open profile is marked by a `profile.lock` file holding the owning
/// process id. A marker left behind after a crash tells the next launch the
/// previous session did not shut down cleanly.
#[derive(Debug)]
pub struct ProfileStore {
    directory: PathBuf,
    open: Mutex<bool>,
}

impl ProfileStore {
    /// Open (or create) the profile in `directory`.
    pub fn open(directory: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self {
            directory: directory.into(),
            open: Mutex::new(false),
        };
        store.write_marker()?;
        *store.open.lock() = true;
        info!(directory = %store.directory.display(), "Profile opened");
        Ok(store)
    }

    /// Profile directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Whether the profile is currently open.
    pub fn is_open(&self) -> bool {
        *self.open.lock()
    }

    /// Whether a profile in `directory` was left open by a previous process.
    pub fn was_left_open(directory: &Path) -> bool {
        directory.join(LOCK_FILE_NAME).exists()
    }

    fn marker_path(&self) -> PathBuf {
        self.directory.join(LOCK_FILE_NAME)
    }

    fn write_marker(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.directory.clone(),
            source,
        };
        fs::create_dir_all(&self.directory).map_err(io_err)?;
        fs::write(self.marker_path(), std::process::id().to_string()).map_err(io_err)
    }

    fn remove_marker(&self) -> Result<(), StoreError> {
        match fs::remove_file(self.marker_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(StoreError::Io {
                path: self.marker_path(),
                source,
            }),
        }
    }
}

impl PersistentStore for ProfileStore {
    fn shutdown(&self) {
        let mut open = self.open.lock();
        if !*open {
            return;
        }
        if let Err(e) = self.remove_marker() {
            warn!(error = %e, "Failed to remove profile marker");
        }
        *open = false;
        info!(directory = %self.directory.display(), "Profile shut down");
    }

    fn reopen(&self) {
        let mut open = self.open.lock();
        if *open {
            return;
        }
        match self.write_marker() {
            Ok(()) => {
                *open = true;
                info!(directory = %self.directory.display(), "Profile reopened");
            }
            Err(e) => warn!(error = %e, "Failed to reopen profile"),
        }
    }
}
