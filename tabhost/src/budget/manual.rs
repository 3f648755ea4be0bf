//! Host-driven background budget.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use parking_lot::Mutex;
use tracing::debug;

use super::{BackgroundTaskBudget, ExpirationHandler, TaskHandle};

/// Background budget whose windows only expire when the host says so.
///
/// Useful for platform shells that receive the expiration signal from the
/// OS themselves, and for deterministic tests of the shutdown race.
///
/// # Example
///
/// ```
/// use tabhost::budget::{BackgroundTaskBudget, ManualBudget};
///
/// let budget = ManualBudget::new();
/// let handle = budget.begin(Box::new(|| println!("out of time")));
///
/// assert_eq!(budget.outstanding(), 1);
/// assert_eq!(budget.expire_all(), 1);
///
/// // Ending after expiry is a no-op
/// budget.end(handle);
/// assert_eq!(budget.ended(), 0);
/// ```
#[derive(Default)]
pub struct ManualBudget {
    next_id: AtomicU64,
    windows: Mutex<BTreeMap<u64, ExpirationHandler>>,
    begun: AtomicUsize,
    ended: AtomicUsize,
    expired: AtomicUsize,
}

impl ManualBudget {
    /// Create an empty budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expire every outstanding window, oldest first.
    ///
    /// Handlers run on the calling thread, outside the table lock.
    /// Returns the number of handlers invoked.
    pub fn expire_all(&self) -> usize {
        let handlers: Vec<ExpirationHandler> = {
            let mut windows = self.windows.lock();
            std::mem::take(&mut *windows).into_values().collect()
        };

        let count = handlers.len();
        for handler in handlers {
            self.expired.fetch_add(1, Ordering::SeqCst);
            handler();
        }
        count
    }

    /// Number of windows granted and not yet ended or expired.
    pub fn outstanding(&self) -> usize {
        self.windows.lock().len()
    }

    /// Total windows granted.
    pub fn begun(&self) -> usize {
        self.begun.load(Ordering::SeqCst)
    }

    /// Windows released by `end` before they expired.
    pub fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }

    /// Windows whose expiration handler ran.
    pub fn expired(&self) -> usize {
        self.expired.load(Ordering::SeqCst)
    }
}

impl BackgroundTaskBudget for ManualBudget {
    fn begin(&self, on_expire: ExpirationHandler) -> TaskHandle {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.windows.lock().insert(id, on_expire);
        self.begun.fetch_add(1, Ordering::SeqCst);
        TaskHandle::new(id)
    }

    fn end(&self, handle: TaskHandle) {
        if self.windows.lock().remove(&handle.id()).is_some() {
            self.ended.fetch_add(1, Ordering::SeqCst);
        } else {
            debug!(task = handle.id(), "Ending an already expired window");
        }
    }
}
