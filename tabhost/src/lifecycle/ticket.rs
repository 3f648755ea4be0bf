//! Single-fire settlement record for one background transition.

use parking_lot::Mutex;

use crate::budget::TaskHandle;
use crate::events::SettleReason;

/// Outcome of trying to settle a transition.
#[derive(Debug)]
pub(super) enum Claim {
    /// This caller settles the transition. Carries the budget handle if it
    /// was already attached; the caller must end it.
    Won(Option<TaskHandle>),
    /// Another path settled first.
    AlreadySettled(SettleReason),
}

#[derive(Debug, Default)]
struct TicketInner {
    handle: Option<TaskHandle>,
    settled: Option<SettleReason>,
}

/// One background transition.
///
/// The sync completion, the budget expiry and termination all race to
/// settle the same ticket. Exactly one wins, and the budget handle leaves
/// the ticket exactly once: either through the winner's claim, or through
/// [`attach`](Self::attach) when settlement beat the handle's arrival.
#[derive(Debug)]
pub(super) struct BackgroundTicket {
    id: u64,
    inner: Mutex<TicketInner>,
}

impl BackgroundTicket {
    pub(super) fn new(id: u64) -> Self {
        Self {
            id,
            inner: Mutex::new(TicketInner::default()),
        }
    }

    pub(super) fn id(&self) -> u64 {
        self.id
    }

    pub(super) fn is_settled(&self) -> bool {
        self.inner.lock().settled.is_some()
    }

    /// Store the budget handle granted for this transition.
    ///
    /// Returns the handle back if the transition already settled, in which
    /// case the caller must end it.
    pub(super) fn attach(&self, handle: TaskHandle) -> Option<TaskHandle> {
        let mut inner = self.inner.lock();
        if inner.settled.is_some() {
            return Some(handle);
        }
        inner.handle = Some(handle);
        None
    }

    /// Try to become the path that settles this transition.
    pub(super) fn claim(&self, reason: SettleReason) -> Claim {
        let mut inner = self.inner.lock();
        if let Some(previous) = inner.settled {
            return Claim::AlreadySettled(previous);
        }
        inner.settled = Some(reason);
        Claim::Won(inner.handle.take())
    }
}
