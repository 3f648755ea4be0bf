//! Test doubles for the coordinator's collaborators.
//!
//! Public so integration tests and host shells can drive the lifecycle
//! deterministically. [`GatedSync`] holds every sync until the test releases
//! it, which lets a test place budget expiry, activation, and sync
//! completion in any order it wants.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tokio::sync::Semaphore;

use crate::launch::{FxaIntent, LaunchHandler, LaunchIntent};
use crate::store::PersistentStore;
use crate::sync::{SyncError, SyncFacade, SyncFuture};

/// Sync facade whose syncs block until [`release`](Self::release)d.
pub struct GatedSync {
    has_account: bool,
    outcome: Mutex<Result<(), SyncError>>,
    gate: Semaphore,
    started: AtomicUsize,
    finished: AtomicUsize,
    backgrounded: AtomicUsize,
    activated: AtomicUsize,
}

impl GatedSync {
    pub fn new(has_account: bool) -> Self {
        Self {
            has_account,
            outcome: Mutex::new(Ok(())),
            gate: Semaphore::new(0),
            started: AtomicUsize::new(0),
            finished: AtomicUsize::new(0),
            backgrounded: AtomicUsize::new(0),
            activated: AtomicUsize::new(0),
        }
    }

    /// Make released syncs finish with `outcome`.
    pub fn with_outcome(self, outcome: Result<(), SyncError>) -> Self {
        *self.outcome.lock() = outcome;
        self
    }

    /// Let one waiting (or future) sync finish.
    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn started(&self) -> usize {
        self.started.load(Ordering::SeqCst)
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }

    /// Calls to `application_did_enter_background`.
    pub fn background_notifications(&self) -> usize {
        self.backgrounded.load(Ordering::SeqCst)
    }

    /// Calls to `application_did_become_active`.
    pub fn active_notifications(&self) -> usize {
        self.activated.load(Ordering::SeqCst)
    }
}

impl SyncFacade for GatedSync {
    fn sync_everything(&self) -> SyncFuture<'_> {
        self.started.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if let Ok(permit) = self.gate.acquire().await {
                permit.forget();
            }
            self.finished.fetch_add(1, Ordering::SeqCst);
            self.outcome.lock().clone()
        })
    }

    fn has_syncable_account(&self) -> bool {
        self.has_account
    }

    fn application_did_enter_background(&self) {
        self.backgrounded.fetch_add(1, Ordering::SeqCst);
    }

    fn application_did_become_active(&self) {
        self.activated.fetch_add(1, Ordering::SeqCst);
    }
}

/// Store that counts shutdowns and reopens.
#[derive(Debug)]
pub struct RecordingStore {
    open: AtomicBool,
    shutdowns: AtomicUsize,
    reopens: AtomicUsize,
}

impl Default for RecordingStore {
    fn default() -> Self {
        Self {
            open: AtomicBool::new(true),
            shutdowns: AtomicUsize::new(0),
            reopens: AtomicUsize::new(0),
        }
    }
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    /// Calls to `shutdown`, including ones on an already closed store.
    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn reopens(&self) -> usize {
        self.reopens.load(Ordering::SeqCst)
    }
}

impl PersistentStore for RecordingStore {
    fn shutdown(&self) {
        self.shutdowns.fetch_add(1, Ordering::SeqCst);
        self.open.store(false, Ordering::SeqCst);
    }

    fn reopen(&self) {
        self.reopens.fetch_add(1, Ordering::SeqCst);
        self.open.store(true, Ordering::SeqCst);
    }
}

/// Launch handler that records what it was asked to do.
#[derive(Debug, Default)]
pub struct RecordingLauncher {
    launches: Mutex<Vec<LaunchIntent>>,
    account_flows: Mutex<Vec<FxaIntent>>,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn launches(&self) -> Vec<LaunchIntent> {
        self.launches.lock().clone()
    }

    pub fn account_flows(&self) -> Vec<FxaIntent> {
        self.account_flows.lock().clone()
    }
}

impl LaunchHandler for RecordingLauncher {
    fn open_launch(&self, intent: &LaunchIntent) {
        self.launches.lock().push(intent.clone());
    }

    fn present_account_flow(&self, intent: &FxaIntent) {
        self.account_flows.lock().push(intent.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_gated_sync_waits_for_release() {
        let sync = Arc::new(GatedSync::new(true).with_outcome(Err(SyncError::Failed("x".into()))));
        let task = {
            let sync = Arc::clone(&sync);
            tokio::spawn(async move { sync.sync_everything().await })
        };

        tokio::task::yield_now().await;
        assert_eq!(sync.finished(), 0);

        sync.release();
        assert_eq!(task.await.unwrap(), Err(SyncError::Failed("x".into())));
        assert_eq!(sync.started(), 1);
        assert_eq!(sync.finished(), 1);
    }

    #[test]
    fn test_recording_store_counts() {
        let store = RecordingStore::new();
        assert!(store.is_open());
        store.shutdown();
        store.shutdown();
        assert!(!store.is_open());
        assert_eq!(store.shutdowns(), 2);
        store.reopen();
        assert!(store.is_open());
        assert_eq!(store.reopens(), 1);
    }
}
