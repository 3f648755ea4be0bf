//! Background execution budget abstraction.
//!
//! Mobile operating systems grant an app a short window of extra CPU time
//! after it leaves the foreground. This module models that window as a
//! trait so the lifecycle coordinator never talks to a platform API
//! directly.
//!
//! # Contract
//!
//! - [`BackgroundTaskBudget::begin`] returns immediately and starts a
//!   countdown.
//! - The expiration callback fires **at most once**, asynchronously, when
//!   the window is nearly exhausted.
//! - If [`BackgroundTaskBudget::end`] runs first, the callback never fires.
//! - `end` after the callback fired is a no-op, not an error.
//!
//! [`TaskHandle`] is neither `Clone` nor `Copy`: ending a handle consumes
//! it, so the compiler rejects a second `end` for the same window.
//!
//! # Implementors
//!
//! - [`TimedBudget`] - tokio timer per window, used by real hosts
//! - [`ManualBudget`] - expiry driven by the host (simulators, tests)

mod manual;
mod timed;

use std::fmt;
use std::time::Duration;

pub use manual::ManualBudget;
pub use timed::TimedBudget;

/// Default length of a background window.
///
/// Matches the typical grant a mobile OS gives an app that asked for more
/// time when entering the background.
pub const DEFAULT_BUDGET_SECS: u64 = 30;

/// Callback invoked when a background window runs out.
pub type ExpirationHandler = Box<dyn FnOnce() + Send + 'static>;

/// Opaque identifier of one granted background window.
///
/// Must be handed back to [`BackgroundTaskBudget::end`] exactly once.
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct TaskHandle(u64);

impl TaskHandle {
    pub(crate) fn new(id: u64) -> Self {
        Self(id)
    }

    /// Numeric identifier, for logging.
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bg-task-{}", self.0)
    }
}

/// Grants and releases background execution windows.
pub trait BackgroundTaskBudget: Send + Sync {
    /// Request a background window.
    ///
    /// `on_expire` runs at most once, on an arbitrary thread, if the window
    /// runs out before [`end`](Self::end) is called.
    fn begin(&self, on_expire: ExpirationHandler) -> TaskHandle;

    /// Release a background window.
    fn end(&self, handle: TaskHandle);
}

/// Configuration for [`TimedBudget`].
#[derive(Debug, Clone)]
pub struct BudgetConfig {
    /// How long a window lasts before its expiration handler fires.
    pub duration: Duration,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            duration: Duration::from_secs(DEFAULT_BUDGET_SECS),
        }
    }
}

impl BudgetConfig {
    /// Set the window length.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }
}
