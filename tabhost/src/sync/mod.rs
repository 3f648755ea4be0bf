//! Sync engine seam.
//!
//! The sync protocol is opaque to the lifecycle coordinator: it only needs
//! to know whether a sync is owed, start one, and learn when it finished.
//! [`SyncFacade`] is that minimal surface.
//!
//! `sync_everything` returns a boxed future rather than being an `async fn`
//! so the trait stays object safe and can live behind `Arc<dyn SyncFacade>`.

mod simulated;

use futures::future::BoxFuture;
use thiserror::Error;

pub use simulated::{SimulatedSync, SimulatedSyncConfig, DEFAULT_SIMULATED_SYNC_MS};

/// Future returned by [`SyncFacade::sync_everything`].
pub type SyncFuture<'a> = BoxFuture<'a, Result<(), SyncError>>;

/// Opaque sync failure.
///
/// The coordinator does not distinguish failure kinds; they are logged and
/// the background shutdown proceeds regardless.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// No account is signed in.
    #[error("No syncable account")]
    NoAccount,

    /// The sync engine reported a failure.
    #[error("Sync failed: {0}")]
    Failed(String),
}

/// Facade over the sync engine.
pub trait SyncFacade: Send + Sync + 'static {
    /// Sync every engine. May take arbitrarily long; never cancelled.
    fn sync_everything(&self) -> SyncFuture<'_>;

    /// Whether a signed-in account exists that a sync could run for.
    fn has_syncable_account(&self) -> bool;

    /// The app left the foreground. Must be cheap and non-blocking.
    fn application_did_enter_background(&self);

    /// The app became interactive. Must be cheap and non-blocking.
    fn application_did_become_active(&self);
}

/// Sync facade for builds without a sync engine.
///
/// Never owes a sync.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSync;

impl SyncFacade for DisabledSync {
    fn sync_everything(&self) -> SyncFuture<'_> {
        Box::pin(async { Err(SyncError::NoAccount) })
    }

    fn has_syncable_account(&self) -> bool {
        false
    }

    fn application_did_enter_background(&self) {}

    fn application_did_become_active(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_sync_error_display() {
        assert_eq!(SyncError::NoAccount.to_string(), "No syncable account");
        assert_eq!(
            SyncError::Failed("timeout".to_string()).to_string(),
            "Sync failed: timeout"
        );
    }

    #[tokio::test]
    async fn test_disabled_sync_never_owes_a_sync() {
        let sync: Arc<dyn SyncFacade> = Arc::new(DisabledSync);
        assert!(!sync.has_syncable_account());
        assert_eq!(sync.sync_everything().await, Err(SyncError::NoAccount));
    }
}
