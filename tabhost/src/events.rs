//! Typed lifecycle event bus.
//!
//! The coordinator publishes what it does here instead of broadcasting
//! untyped notifications. Subscribers receive every event published after
//! they subscribed; a subscriber that falls behind by more than the channel
//! capacity loses the oldest events (`RecvError::Lagged`).
//!
//! # Subscribers
//!
//! - The CLI `simulate` command prints every event.
//! - Integration tests assert on event order.
//!
//! Publishing with no subscribers is not an error.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::launch::{FxaIntent, LaunchIntent};
use crate::lifecycle::LifecycleState;

/// Default event channel capacity.
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Why a background transition was settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SettleReason {
    /// No syncable account; nothing to wait for.
    NoSyncNeeded,
    /// The sync round trip finished (successfully or not).
    SyncFinished,
    /// The background budget ran out first.
    BudgetExpired,
    /// The process is terminating.
    Terminating,
}

/// Something the lifecycle coordinator did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LifecycleEvent {
    StateChanged {
        from: LifecycleState,
        to: LifecycleState,
    },
    SyncStarted,
    SyncFinished {
        ok: bool,
    },
    BudgetExpired,
    StoreShutdown {
        reason: SettleReason,
    },
    StoreShutdownSkipped {
        reason: SettleReason,
    },
    StoreReopened,
    LaunchDeferred {
        intent: LaunchIntent,
    },
    LaunchExecuted {
        intent: LaunchIntent,
    },
    AccountFlowPresented {
        intent: FxaIntent,
    },
}

/// Broadcast bus for [`LifecycleEvent`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct LifecycleEvents {
    tx: broadcast::Sender<LifecycleEvent>,
}

impl Default for LifecycleEvents {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl LifecycleEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<LifecycleEvent> {
        self.tx.subscribe()
    }

    /// Publish an event to all current subscribers.
    pub fn publish(&self, event: LifecycleEvent) {
        // Err only means nobody is listening.
        let _ = self.tx.send(event);
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
