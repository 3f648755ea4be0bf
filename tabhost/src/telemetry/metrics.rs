//! Atomic usage counters.

use std::sync::atomic::{AtomicU64, Ordering};

use super::snapshot::UsageSnapshot;

/// Lock-free counters updated by the lifecycle coordinator.
#[derive(Debug, Default)]
pub struct UsageMetrics {
    foreground_secs: AtomicU64,
    foreground_sessions: AtomicU64,
    syncs_started: AtomicU64,
    syncs_failed: AtomicU64,
    store_shutdowns: AtomicU64,
    shutdowns_skipped: AtomicU64,
    budget_expirations: AtomicU64,
    launches_deferred: AtomicU64,
    launches_executed: AtomicU64,
    account_flows: AtomicU64,
}

impl UsageMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// A foreground session of `secs` seconds ended.
    ///
    /// Negative durations (wall clock moved backwards) count as zero.
    pub fn foreground_session_ended(&self, secs: i64) {
        self.foreground_secs
            .fetch_add(secs.max(0) as u64, Ordering::Relaxed);
        self.foreground_sessions.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sync_started(&self) {
        self.syncs_started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn sync_finished(&self, ok: bool) {
        if !ok {
            self.syncs_failed.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn store_shutdown(&self) {
        self.store_shutdowns.fetch_add(1, Ordering::Relaxed);
    }

    pub fn shutdown_skipped(&self) {
        self.shutdowns_skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn budget_expired(&self) {
        self.budget_expirations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn launch_deferred(&self) {
        self.launches_deferred.fetch_add(1, Ordering::Relaxed);
    }

    pub fn launch_executed(&self) {
        self.launches_executed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn account_flow_presented(&self) {
        self.account_flows.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> UsageSnapshot {
        UsageSnapshot {
            foreground_secs: self.foreground_secs.load(Ordering::Relaxed),
            foreground_sessions: self.foreground_sessions.load(Ordering::Relaxed),
            syncs_started: self.syncs_started.load(Ordering::Relaxed),
            syncs_failed: self.syncs_failed.load(Ordering::Relaxed),
            store_shutdowns: self.store_shutdowns.load(Ordering::Relaxed),
            shutdowns_skipped: self.shutdowns_skipped.load(Ordering::Relaxed),
            budget_expirations: self.budget_expirations.load(Ordering::Relaxed),
            launches_deferred: self.launches_deferred.load(Ordering::Relaxed),
            launches_executed: self.launches_executed.load(Ordering::Relaxed),
            account_flows: self.account_flows.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_new_metrics_are_zero() {
        assert_eq!(UsageMetrics::new().snapshot(), UsageSnapshot::default());
    }

    #[test]
    fn test_foreground_sessions_accumulate() {
        let metrics = UsageMetrics::new();
        metrics.foreground_session_ended(30);
        metrics.foreground_session_ended(12);
        metrics.foreground_session_ended(-5);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.foreground_secs, 42);
        assert_eq!(snapshot.foreground_sessions, 3);
    }

    #[test]
    fn test_sync_failures_counted_separately() {
        let metrics = UsageMetrics::new();
        metrics.sync_started();
        metrics.sync_finished(false);
        metrics.sync_started();
        metrics.sync_finished(true);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.syncs_started, 2);
        assert_eq!(snapshot.syncs_failed, 1);
    }

    #[test]
    fn test_thread_safe_counting() {
        use std::thread;

        let metrics = Arc::new(UsageMetrics::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let m = Arc::clone(&metrics);
                thread::spawn(move || {
                    for _ in 0..50 {
                        m.store_shutdown();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(metrics.snapshot().store_shutdowns, 400);
    }
}
