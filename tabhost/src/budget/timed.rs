//! Timer-backed background budget.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::{BackgroundTaskBudget, BudgetConfig, ExpirationHandler, TaskHandle};

/// Background budget that expires each window after a fixed duration.
///
/// Each window owns an entry in a handle table. Whichever of `end` and the
/// timer removes the entry first wins; the loser finds nothing and does
/// nothing. That single removal under the table lock is what makes the
/// "never fires after `end`" and "`end` after expiry is a no-op" guarantees
/// hold without any further coordination.
pub struct TimedBudget {
    config: BudgetConfig,
    runtime: Handle,
    next_id: AtomicU64,
    windows: Arc<Mutex<HashMap<u64, CancellationToken>>>,
}

impl TimedBudget {
    /// Create a budget whose timers run on the given runtime.
    pub fn new(config: BudgetConfig, runtime: Handle) -> Self {
        Self {
            config,
            runtime,
            next_id: AtomicU64::new(1),
            windows: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of windows currently granted and not yet ended or expired.
    pub fn outstanding(&self) -> usize {
        self.windows.lock().len()
    }
}

impl BackgroundTaskBudget for TimedBudget {
    fn begin(&self, on_expire: ExpirationHandler) -> TaskHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.windows.lock().insert(id, token.clone());

        let windows = Arc::clone(&self.windows);
        let duration = self.config.duration;
        self.runtime.spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(duration) => {
                    // Removal decides the race against `end`.
                    let expired = windows.lock().remove(&id).is_some();
                    if expired {
                        info!(task = id, "Background budget expired");
                        on_expire();
                    }
                }
            }
        });

        debug!(task = id, duration_ms = duration.as_millis() as u64, "Background budget granted");
        TaskHandle::new(id)
    }

    fn end(&self, handle: TaskHandle) {
        match self.windows.lock().remove(&handle.id()) {
            Some(token) => {
                token.cancel();
                debug!(task = handle.id(), "Background budget released");
            }
            None => debug!(task = handle.id(), "Background budget already expired"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::Duration;

    fn counting_handler(counter: &Arc<AtomicUsize>) -> ExpirationHandler {
        let counter = Arc::clone(counter);
        Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    fn budget(duration: Duration) -> TimedBudget {
        TimedBudget::new(
            BudgetConfig::default().with_duration(duration),
            Handle::current(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_expires_once_when_not_ended() {
        let budget = budget(Duration::from_secs(30));
        let fired = Arc::new(AtomicUsize::new(0));

        let handle = budget.begin(counting_handler(&fired));
        assert_eq!(budget.outstanding(), 1);

        tokio::time::sleep(Duration::from_secs(31)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(budget.outstanding(), 0);

        // Late end is a no-op
        budget.end(handle);
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_end_before_expiry_suppresses_handler() {
        let budget = budget(Duration::from_secs(30));
        let fired = Arc::new(AtomicUsize::new(0));

        let handle = budget.begin(counting_handler(&fired));
        budget.end(handle);
        assert_eq!(budget.outstanding(), 0);

        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_windows_are_independent() {
        let budget = budget(Duration::from_secs(10));
        let first = Arc::new(AtomicUsize::new(0));
        let second = Arc::new(AtomicUsize::new(0));

        let h1 = budget.begin(counting_handler(&first));
        let h2 = budget.begin(counting_handler(&second));
        assert_ne!(h1.id(), h2.id());

        budget.end(h1);
        tokio::time::sleep(Duration::from_secs(11)).await;

        assert_eq!(first.load(Ordering::SeqCst), 0);
        assert_eq!(second.load(Ordering::SeqCst), 1);
        budget.end(h2);
    }
}
