//! Persistent store seam.
//!
//! The profile database is shared with the rest of the app and outlives the
//! lifecycle coordinator. The coordinator only ever closes it before the
//! process is suspended and reopens it when the app comes back.
//!
//! Both operations must be idempotent: the shutdown race can reach
//! `shutdown` from more than one path, and reopening an open store must not
//! disturb it.

mod profile;

use std::path::PathBuf;

use thiserror::Error;

pub use profile::{ProfileStore, LOCK_FILE_NAME};

/// Errors raised by store implementations.
///
/// These never cross the [`PersistentStore`] seam; implementations log them
/// since the shutdown path has nobody to report to.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Failed to write or remove the open marker.
    #[error("Store I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Profile storage that must be closed before the process is suspended.
pub trait PersistentStore: Send + Sync {
    /// Close the store. Idempotent; safe to call from a deadline handler.
    fn shutdown(&self);

    /// Reopen the store after a shutdown. A no-op if already open.
    fn reopen(&self);
}
