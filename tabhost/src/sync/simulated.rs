//! Simulated sync engine for the CLI host.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tracing::{debug, info};

use super::{SyncError, SyncFacade, SyncFuture};

/// Default simulated sync round-trip time in milliseconds.
pub const DEFAULT_SIMULATED_SYNC_MS: u64 = 2_000;

/// Configuration for [`SimulatedSync`].
#[derive(Debug, Clone)]
pub struct SimulatedSyncConfig {
    /// Whether a signed-in account exists.
    pub has_account: bool,

    /// How long a full sync takes.
    pub duration: Duration,

    /// Whether every sync reports failure.
    pub fail: bool,
}

impl Default for SimulatedSyncConfig {
    fn default() -> Self {
        Self {
            has_account: true,
            duration: Duration::from_millis(DEFAULT_SIMULATED_SYNC_MS),
            fail: false,
        }
    }
}

impl SimulatedSyncConfig {
    /// Set whether an account is signed in.
    pub fn with_account(mut self, has_account: bool) -> Self {
        self.has_account = has_account;
        self
    }

    /// Set the sync duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Make every sync fail.
    pub fn with_failure(mut self, fail: bool) -> Self {
        self.fail = fail;
        self
    }
}

/// Sync engine stand-in that sleeps for a configured duration.
#[derive(Debug, Default)]
pub struct SimulatedSync {
    config: SimulatedSyncConfig,
    syncs_started: AtomicUsize,
}

impl SimulatedSync {
    pub fn new(config: SimulatedSyncConfig) -> Self {
        Self {
            config,
            syncs_started: AtomicUsize::new(0),
        }
    }

    /// Number of syncs started so far.
    pub fn syncs_started(&self) -> usize {
        self.syncs_started.load(Ordering::Relaxed)
    }
}

impl SyncFacade for SimulatedSync {
    fn sync_everything(&self) -> SyncFuture<'_> {
        let run = self.syncs_started.fetch_add(1, Ordering::Relaxed) + 1;
        Box::pin(async move {
            info!(run, duration_ms = self.config.duration.as_millis() as u64, "Sync started");
            tokio::time::sleep(self.config.duration).await;
            if self.config.fail {
                Err(SyncError::Failed("simulated failure".to_string()))
            } else {
                Ok(())
            }
        })
    }

    fn has_syncable_account(&self) -> bool {
        self.config.has_account
    }

    fn application_did_enter_background(&self) {
        debug!("Sync timers paused");
    }

    fn application_did_become_active(&self) {
        debug!("Sync timers resumed");
    }
}
