//! Point-in-time usage snapshot.

use serde::Serialize;

/// Copy of [`UsageMetrics`](super::UsageMetrics) counters at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UsageSnapshot {
    /// Total seconds spent interactive.
    pub foreground_secs: u64,
    /// Completed foreground sessions.
    pub foreground_sessions: u64,
    pub syncs_started: u64,
    pub syncs_failed: u64,
    /// Store shutdowns performed by background transitions or termination.
    pub store_shutdowns: u64,
    /// Background transitions that skipped shutdown because the app was
    /// back in the foreground.
    pub shutdowns_skipped: u64,
    pub budget_expirations: u64,
    pub launches_deferred: u64,
    pub launches_executed: u64,
    pub account_flows: u64,
}

impl UsageSnapshot {
    /// Average foreground session length in seconds.
    pub fn average_session_secs(&self) -> f64 {
        if self.foreground_sessions == 0 {
            return 0.0;
        }
        self.foreground_secs as f64 / self.foreground_sessions as f64
    }

    /// Human-readable total foreground time (e.g. `1h 02m 05s`).
    pub fn foreground_human(&self) -> String {
        let secs = self.foreground_secs;
        let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
        if h > 0 {
            format!("{}h {:02}m {:02}s", h, m, s)
        } else if m > 0 {
            format!("{}m {:02}s", m, s)
        } else {
            format!("{}s", s)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_average_session() {
        let snapshot = UsageSnapshot {
            foreground_secs: 90,
            foreground_sessions: 3,
            ..Default::default()
        };
        assert_eq!(snapshot.average_session_secs(), 30.0);
        assert_eq!(UsageSnapshot::default().average_session_secs(), 0.0);
    }

    #[test]
    fn test_foreground_human() {
        let mut snapshot = UsageSnapshot::default();
        snapshot.foreground_secs = 5;
        assert_eq!(snapshot.foreground_human(), "5s");
        snapshot.foreground_secs = 125;
        assert_eq!(snapshot.foreground_human(), "2m 05s");
        snapshot.foreground_secs = 3725;
        assert_eq!(snapshot.foreground_human(), "1h 02m 05s");
    }
}
