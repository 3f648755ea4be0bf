//! The lifecycle coordinator.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::error::LifecycleError;
use super::foreground::{foreground_queue, ForegroundLoop, ForegroundQueue};
use super::state::LifecycleState;
use super::ticket::{BackgroundTicket, Claim};
use crate::budget::BackgroundTaskBudget;
use crate::events::{LifecycleEvent, LifecycleEvents, SettleReason};
use crate::launch::{FxaIntent, Intent, LaunchHandler, LaunchIntent};
use crate::store::PersistentStore;
use crate::sync::SyncFacade;
use crate::telemetry::{Clock, SystemClock, UsageMetrics};

/// What the coordinator decided to do with a submitted launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchDisposition {
    /// The app is active; the caller executes the intent now.
    Immediate(LaunchIntent),
    /// Parked in the pending slot until the next activation.
    Deferred,
}

#[derive(Debug)]
struct CoordinatorState {
    lifecycle: LifecycleState,
    pending_launch: Option<LaunchIntent>,
    foreground_epoch: Option<i64>,
    store_closed: bool,
    transition: Option<Arc<BackgroundTicket>>,
    next_transition_id: u64,
    sync_tasks: Vec<JoinHandle<()>>,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self {
            lifecycle: LifecycleState::Inactive,
            pending_launch: None,
            foreground_epoch: None,
            store_closed: false,
            transition: None,
            next_transition_id: 0,
            sync_tasks: Vec::new(),
        }
    }
}

struct Shared {
    sync: Arc<dyn SyncFacade>,
    store: Arc<dyn PersistentStore>,
    budget: Arc<dyn BackgroundTaskBudget>,
    launcher: Arc<dyn LaunchHandler>,
    foreground: ForegroundQueue,
    events: LifecycleEvents,
    metrics: Arc<UsageMetrics>,
    clock: Arc<dyn Clock>,
    runtime: Handle,
    state: Mutex<CoordinatorState>,
}

/// Coordinates OS lifecycle notifications with sync, storage and launches.
///
/// Cheap to clone; clones share state. All `on_*` methods are meant to be
/// called from the host's foreground thread, serially, as the OS delivers
/// them. Background completions may run concurrently with them on runtime
/// worker threads; every piece of shared state is behind one lock.
///
/// # Background transitions
///
/// ```text
/// on_enter_background
///   ├─ sync.application_did_enter_background()
///   ├─ budget.begin(on_expire) ──────────────► expiry ─┐
///   └─ has_syncable_account?                           │
///        ├─ yes: spawn sync_everything ──► done ───────┤
///        └─ no ────────────────────────────────────────┤
///                                                      ▼
///                                  settle (first caller only)
///                                    ├─ state != Active → store.shutdown()
///                                    └─ budget.end(handle)
/// ```
#[derive(Clone)]
pub struct LifecycleCoordinator {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for LifecycleCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.shared.state.lock();
        f.debug_struct("LifecycleCoordinator")
            .field("lifecycle", &state.lifecycle)
            .field("pending_launch", &state.pending_launch)
            .field("store_closed", &state.store_closed)
            .finish()
    }
}

impl LifecycleCoordinator {
    /// Start building a coordinator around its collaborators.
    pub fn builder(
        sync: Arc<dyn SyncFacade>,
        store: Arc<dyn PersistentStore>,
        budget: Arc<dyn BackgroundTaskBudget>,
        launcher: Arc<dyn LaunchHandler>,
    ) -> CoordinatorBuilder {
        CoordinatorBuilder {
            sync,
            store,
            budget,
            launcher,
            events: None,
            metrics: None,
            clock: None,
            runtime: None,
        }
    }

    // ------------------------------------------------------------------
    // OS lifecycle notifications
    // ------------------------------------------------------------------

    /// The app became interactive.
    ///
    /// Reopens the store if a background transition closed it, resumes sync
    /// timers, starts a new foreground epoch, and queues the pending launch
    /// (if any) for the next foreground turn. The replay is queued before the
    /// state lock is released, so any launch submitted after activation runs
    /// after it.
    pub fn on_become_active(&self) {
        let shared = &self.shared;
        {
            let mut state = shared.state.lock();
            if state.lifecycle == LifecycleState::Active {
                debug!("Already active; ignoring activation");
                return;
            }
            shared.reopen_store_if_closed(&mut state);
            shared.transition_to(&mut state, LifecycleState::Active);
            state.foreground_epoch = Some(shared.clock.now_secs());
            if let Some(intent) = state.pending_launch.take() {
                shared.replay_pending(&mut state, intent);
            }
        }

        shared.sync.application_did_become_active();
    }

    /// The app is about to stop being interactive.
    pub fn on_will_resign_active(&self) {
        let mut state = self.shared.state.lock();
        if state.lifecycle != LifecycleState::Active {
            debug!(state = %state.lifecycle, "Resign while not active");
            return;
        }
        self.shared.close_foreground_epoch(&mut state);
        self.shared
            .transition_to(&mut state, LifecycleState::Inactive);
    }

    /// The app moved to the background.
    ///
    /// Returns immediately; the sync (if owed) and the store shutdown finish
    /// asynchronously under a background budget.
    pub fn on_enter_background(&self) {
        let shared = &self.shared;
        let ticket = {
            let mut state = shared.state.lock();
            if state.lifecycle.is_background() {
                debug!(
                    state = %state.lifecycle,
                    "Background transition already handled; ignoring"
                );
                return;
            }
            if state.lifecycle == LifecycleState::Active {
                shared.close_foreground_epoch(&mut state);
            }
            shared.transition_to(&mut state, LifecycleState::EnteringBackground);
            state.next_transition_id += 1;
            let ticket = Arc::new(BackgroundTicket::new(state.next_transition_id));
            state.transition = Some(Arc::clone(&ticket));
            ticket
        };

        shared.sync.application_did_enter_background();

        let expire_shared = Arc::clone(shared);
        let expire_ticket = Arc::clone(&ticket);
        let handle = shared.budget.begin(Box::new(move || {
            expire_shared.settle(&expire_ticket, SettleReason::BudgetExpired);
        }));
        info!(transition = ticket.id(), budget = %handle, "Entered background");
        if let Some(handle) = ticket.attach(handle) {
            // Expired before we could store the handle.
            shared.budget.end(handle);
        }

        if shared.sync.has_syncable_account() {
            shared.spawn_sync(ticket);
        } else {
            debug!(transition = ticket.id(), "No syncable account; skipping sync");
            shared.settle(&ticket, SettleReason::NoSyncNeeded);
        }
    }

    /// The app is about to leave the background.
    pub fn on_will_enter_foreground(&self) {
        let mut state = self.shared.state.lock();
        self.shared.reopen_store_if_closed(&mut state);
        if state.lifecycle.is_background() {
            self.shared
                .transition_to(&mut state, LifecycleState::Inactive);
        }
    }

    /// The process is about to exit.
    ///
    /// Settles any outstanding background transition (releasing its budget)
    /// and shuts the store down unconditionally.
    pub fn on_will_terminate(&self) {
        let shared = &self.shared;
        let outstanding = shared.state.lock().transition.take();
        if let Some(ticket) = outstanding {
            shared.settle(&ticket, SettleReason::Terminating);
        }

        let mut state = shared.state.lock();
        if state.lifecycle == LifecycleState::Active {
            shared.close_foreground_epoch(&mut state);
        }
        if !state.store_closed {
            shared.shutdown_store(&mut state, SettleReason::Terminating);
        }
        shared.transition_to(&mut state, LifecycleState::Backgrounded);
        info!("Terminated");
    }

    // ------------------------------------------------------------------
    // Launches
    // ------------------------------------------------------------------

    /// Hand a launch to the coordinator.
    ///
    /// If the app is active the intent comes straight back for immediate
    /// execution. Otherwise it replaces whatever launch was pending. The
    /// check and the store are one step with respect to activation, so a
    /// launch can never slip past the activation that should consume it.
    pub fn submit_launch(&self, intent: LaunchIntent) -> LaunchDisposition {
        let shared = &self.shared;
        let mut state = shared.state.lock();
        if state.lifecycle == LifecycleState::Active {
            return LaunchDisposition::Immediate(intent);
        }

        if let Some(previous) = state.pending_launch.replace(intent.clone()) {
            debug!(replaced = %previous, "Pending launch replaced");
        }
        info!(intent = %intent, state = %state.lifecycle, "Launch deferred until active");
        shared.metrics.launch_deferred();
        shared
            .events
            .publish(LifecycleEvent::LaunchDeferred { intent });
        LaunchDisposition::Deferred
    }

    /// Schedule an intent on the foreground queue.
    ///
    /// Immediate launches share the queue with replayed pending launches, so
    /// every launch runs on the foreground context in submission order.
    /// Returns `false` if the foreground loop has gone away.
    pub fn execute(&self, intent: &Intent) -> bool {
        let shared = Arc::clone(&self.shared);
        let queued = intent.clone();
        let dispatched = self.shared.foreground.dispatch(move || match &queued {
            Intent::Launch(launch) => shared.execute_launch(launch),
            Intent::Fxa(fxa) => shared.present_account_flow(fxa),
        });
        if !dispatched {
            warn!(intent = %intent, "Foreground loop unavailable; dropping launch");
        }
        dispatched
    }

    // ------------------------------------------------------------------
    // Accessors
    // ------------------------------------------------------------------

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.shared.state.lock().lifecycle
    }

    /// The launch waiting for the next activation, if any.
    pub fn pending_launch(&self) -> Option<LaunchIntent> {
        self.shared.state.lock().pending_launch.clone()
    }

    /// Start of the current foreground session (seconds since the Unix epoch).
    pub fn foreground_epoch(&self) -> Option<i64> {
        self.shared.state.lock().foreground_epoch
    }

    /// Whether a background transition closed the store and nothing has
    /// reopened it since.
    pub fn is_store_closed(&self) -> bool {
        self.shared.state.lock().store_closed
    }

    /// Whether a background transition is still waiting to settle.
    pub fn is_transition_outstanding(&self) -> bool {
        self.shared
            .state
            .lock()
            .transition
            .as_ref()
            .is_some_and(|ticket| !ticket.is_settled())
    }

    /// Usage counters.
    pub fn metrics(&self) -> Arc<UsageMetrics> {
        Arc::clone(&self.shared.metrics)
    }

    /// Event bus the coordinator publishes to.
    pub fn events(&self) -> LifecycleEvents {
        self.shared.events.clone()
    }

    /// Wait until every background sync spawned so far has finished.
    ///
    /// Does not wait for budget expiry.
    pub async fn wait_for_background_sync(&self) {
        let tasks = std::mem::take(&mut self.shared.state.lock().sync_tasks);
        for task in tasks {
            if let Err(e) = task.await {
                warn!(error = %e, "Background sync task aborted");
            }
        }
    }
}

impl Shared {
    fn transition_to(&self, state: &mut CoordinatorState, to: LifecycleState) {
        let from = state.lifecycle;
        if from == to {
            return;
        }
        state.lifecycle = to;
        debug!(%from, %to, "Lifecycle state changed");
        self.events.publish(LifecycleEvent::StateChanged { from, to });
    }

    fn close_foreground_epoch(&self, state: &mut CoordinatorState) {
        if let Some(epoch) = state.foreground_epoch.take() {
            let elapsed = self.clock.now_secs() - epoch;
            self.metrics.foreground_session_ended(elapsed);
            debug!(elapsed_secs = elapsed, "Foreground session ended");
        }
    }

    fn reopen_store_if_closed(&self, state: &mut CoordinatorState) {
        if state.store_closed {
            self.store.reopen();
            state.store_closed = false;
            self.events.publish(LifecycleEvent::StoreReopened);
            info!("Store reopened");
        }
    }

    fn shutdown_store(&self, state: &mut CoordinatorState, reason: SettleReason) {
        self.store.shutdown();
        state.store_closed = true;
        self.metrics.store_shutdown();
        self.events
            .publish(LifecycleEvent::StoreShutdown { reason });
        info!(?reason, "Store shut down");
    }

    fn spawn_sync(self: &Arc<Self>, ticket: Arc<BackgroundTicket>) {
        self.metrics.sync_started();
        self.events.publish(LifecycleEvent::SyncStarted);

        let shared = Arc::clone(self);
        let task = self.runtime.spawn(async move {
            let result = shared.sync.sync_everything().await;
            let ok = result.is_ok();
            match result {
                Ok(()) => info!(transition = ticket.id(), "Background sync finished"),
                Err(e) => warn!(
                    transition = ticket.id(),
                    error = %e,
                    "Background sync failed; shutting down anyway"
                ),
            }
            shared.metrics.sync_finished(ok);
            shared.events.publish(LifecycleEvent::SyncFinished { ok });
            shared.settle(&ticket, SettleReason::SyncFinished);
        });

        let mut state = self.state.lock();
        state.sync_tasks.retain(|task| !task.is_finished());
        state.sync_tasks.push(task);
    }

    /// Settle a background transition: shut the store down unless the app
    /// is back in the foreground, then release the budget. Only the first
    /// caller per ticket does anything.
    fn settle(&self, ticket: &BackgroundTicket, reason: SettleReason) {
        let handle = match ticket.claim(reason) {
            Claim::Won(handle) => handle,
            Claim::AlreadySettled(previous) => {
                debug!(
                    transition = ticket.id(),
                    ?reason,
                    ?previous,
                    "Background transition already settled"
                );
                return;
            }
        };

        if reason == SettleReason::BudgetExpired {
            warn!(transition = ticket.id(), "Background budget expired before sync finished");
            self.metrics.budget_expired();
            self.events.publish(LifecycleEvent::BudgetExpired);
        }

        {
            let mut state = self.state.lock();
            let is_current = state
                .transition
                .as_ref()
                .is_some_and(|current| current.id() == ticket.id());

            if state.lifecycle == LifecycleState::Active {
                info!(
                    transition = ticket.id(),
                    ?reason,
                    "App is active again; skipping store shutdown"
                );
                self.metrics.shutdown_skipped();
                self.events
                    .publish(LifecycleEvent::StoreShutdownSkipped { reason });
            } else {
                self.shutdown_store(&mut state, reason);
                if is_current && state.lifecycle == LifecycleState::EnteringBackground {
                    self.transition_to(&mut state, LifecycleState::Backgrounded);
                }
            }

            if is_current {
                state.transition = None;
            }
        }

        if let Some(handle) = handle {
            self.budget.end(handle);
        }
    }

    fn replay_pending(self: &Arc<Self>, state: &mut CoordinatorState, intent: LaunchIntent) {
        let shared = Arc::clone(self);
        let queued = intent.clone();
        if !self.foreground.dispatch(move || shared.execute_launch(&queued)) {
            warn!(intent = %intent, "Foreground loop unavailable; keeping launch pending");
            state.pending_launch = Some(intent);
        }
    }

    fn execute_launch(&self, intent: &LaunchIntent) {
        info!(intent = %intent, "Executing launch");
        self.launcher.open_launch(intent);
        self.metrics.launch_executed();
        self.events.publish(LifecycleEvent::LaunchExecuted {
            intent: intent.clone(),
        });
    }

    fn present_account_flow(&self, intent: &FxaIntent) {
        info!(view = %intent.view, "Presenting account flow");
        self.launcher.present_account_flow(intent);
        self.metrics.account_flow_presented();
        self.events.publish(LifecycleEvent::AccountFlowPresented {
            intent: intent.clone(),
        });
    }
}

/// Builder for [`LifecycleCoordinator`].
pub struct CoordinatorBuilder {
    sync: Arc<dyn SyncFacade>,
    store: Arc<dyn PersistentStore>,
    budget: Arc<dyn BackgroundTaskBudget>,
    launcher: Arc<dyn LaunchHandler>,
    events: Option<LifecycleEvents>,
    metrics: Option<Arc<UsageMetrics>>,
    clock: Option<Arc<dyn Clock>>,
    runtime: Option<Handle>,
}

impl CoordinatorBuilder {
    /// Publish to an existing event bus.
    pub fn with_events(mut self, events: LifecycleEvents) -> Self {
        self.events = Some(events);
        self
    }

    /// Record into existing usage counters.
    pub fn with_metrics(mut self, metrics: Arc<UsageMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Use a custom clock for foreground epochs.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Spawn background syncs on this runtime instead of the current one.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// Build the coordinator and the foreground loop it dispatches to.
    ///
    /// The host must either spawn [`ForegroundLoop::run`] or pump
    /// [`ForegroundLoop::drain`] from its UI loop; deferred launches execute
    /// there.
    ///
    /// # Errors
    ///
    /// Returns [`LifecycleError::NoRuntime`] if no runtime handle was given
    /// and the caller is not inside a Tokio runtime.
    pub fn build(self) -> Result<(LifecycleCoordinator, ForegroundLoop), LifecycleError> {
        let runtime = match self.runtime {
            Some(runtime) => runtime,
            None => Handle::try_current().map_err(|e| LifecycleError::NoRuntime(e.to_string()))?,
        };
        let (foreground, foreground_loop) = foreground_queue();

        let shared = Shared {
            sync: self.sync,
            store: self.store,
            budget: self.budget,
            launcher: self.launcher,
            foreground,
            events: self.events.unwrap_or_default(),
            metrics: self.metrics.unwrap_or_default(),
            clock: self.clock.unwrap_or_else(|| Arc::new(SystemClock)),
            runtime,
            state: Mutex::new(CoordinatorState::default()),
        };

        Ok((
            LifecycleCoordinator {
                shared: Arc::new(shared),
            },
            foreground_loop,
        ))
    }
}
