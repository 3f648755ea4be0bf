//! Application bootstrap implementation.
//!
//! This module contains `TabHostApp`, which builds the lifecycle coordinator
//! from its collaborators, starts the foreground loop, and owns the
//! shutdown sequence.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::{Handle, Runtime};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::config::AppConfig;
use super::error::AppError;
use crate::budget::{BackgroundTaskBudget, TimedBudget};
use crate::events::LifecycleEvents;
use crate::launch::{LaunchHandler, LaunchRouter};
use crate::lifecycle::LifecycleCoordinator;
use crate::store::{PersistentStore, ProfileStore};
use crate::sync::{SimulatedSync, SyncFacade};
use crate::telemetry::{Clock, UsageSnapshot};

/// How long `shutdown_sync` waits for runtime tasks to wind down.
const RUNTIME_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// The services the coordinator drives.
///
/// Budget and clock are optional; a [`TimedBudget`] from
/// [`AppConfig::budget`] and the system clock are used when absent.
pub struct Collaborators {
    pub sync: Arc<dyn SyncFacade>,
    pub store: Arc<dyn PersistentStore>,
    pub launcher: Arc<dyn LaunchHandler>,
    pub budget: Option<Arc<dyn BackgroundTaskBudget>>,
    pub clock: Option<Arc<dyn Clock>>,
}

impl Collaborators {
    pub fn new(
        sync: Arc<dyn SyncFacade>,
        store: Arc<dyn PersistentStore>,
        launcher: Arc<dyn LaunchHandler>,
    ) -> Self {
        Self {
            sync,
            store,
            launcher,
            budget: None,
            clock: None,
        }
    }

    /// Collaborators for a host without a real sync engine or database:
    /// a [`SimulatedSync`] and a [`ProfileStore`] in the configured directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the profile directory cannot be opened.
    pub fn simulated(
        config: &AppConfig,
        launcher: Arc<dyn LaunchHandler>,
    ) -> Result<Self, AppError> {
        let store = ProfileStore::open(&config.profile_dir)?;
        Ok(Self::new(
            Arc::new(SimulatedSync::new(config.sync.clone())),
            Arc::new(store),
            launcher,
        ))
    }

    /// Use a specific background budget.
    pub fn with_budget(mut self, budget: Arc<dyn BackgroundTaskBudget>) -> Self {
        self.budget = Some(budget);
        self
    }

    /// Use a specific clock for foreground epochs.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }
}

/// TabHost application with managed lifecycle.
///
/// Startup order:
/// 1. Budget (defaulted from config if not injected)
/// 2. Lifecycle coordinator on the shared event bus
/// 3. Foreground loop, spawned on the runtime
/// 4. Launch router
///
/// Shutdown runs termination through the coordinator first, so the store is
/// closed before the foreground loop stops.
pub struct TabHostApp {
    coordinator: LifecycleCoordinator,
    router: LaunchRouter,
    events: LifecycleEvents,
    foreground_shutdown: CancellationToken,
    foreground_task: Option<JoinHandle<()>>,
    config: AppConfig,
    handle: Handle,

    /// Owned runtime when created via `start_sync()`.
    runtime: Option<Runtime>,
}

impl TabHostApp {
    /// Start the application on the current Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the coordinator cannot be built.
    pub async fn start(config: AppConfig, collaborators: Collaborators) -> Result<Self, AppError> {
        Self::start_on(config, collaborators, Handle::current())
    }

    /// Start the application with its own multi-threaded runtime.
    ///
    /// For callers without an async context, like CLI commands. The runtime
    /// lives as long as the app; use [`shutdown_sync`](Self::shutdown_sync)
    /// to stop it.
    pub fn start_sync(config: AppConfig, collaborators: Collaborators) -> Result<Self, AppError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .thread_name("tabhost-worker")
            .build()
            .map_err(|e| AppError::RuntimeCreation(e.to_string()))?;

        let mut app = Self::start_on(config, collaborators, runtime.handle().clone())?;
        app.runtime = Some(runtime);
        Ok(app)
    }

    fn start_on(
        config: AppConfig,
        collaborators: Collaborators,
        handle: Handle,
    ) -> Result<Self, AppError> {
        config.validate()?;
        info!(version = crate::VERSION, "Starting TabHostApp");

        let budget = match collaborators.budget {
            Some(budget) => budget,
            None => {
                info!(
                    budget_secs = config.budget.duration.as_secs_f64(),
                    "Using timed background budget"
                );
                Arc::new(TimedBudget::new(config.budget.clone(), handle.clone()))
            }
        };

        let events = LifecycleEvents::new(config.event_capacity);
        let mut builder = LifecycleCoordinator::builder(
            collaborators.sync,
            collaborators.store,
            budget,
            collaborators.launcher,
        )
        .with_events(events.clone())
        .with_runtime(handle.clone());
        if let Some(clock) = collaborators.clock {
            builder = builder.with_clock(clock);
        }
        let (coordinator, foreground) = builder.build()?;

        let foreground_shutdown = CancellationToken::new();
        let foreground_task = handle.spawn(foreground.run(foreground_shutdown.clone()));

        let router = LaunchRouter::new(config.launch.clone(), coordinator.clone());
        info!(schemes = ?config.launch.schemes, "TabHostApp started");

        Ok(Self {
            coordinator,
            router,
            events,
            foreground_shutdown,
            foreground_task: Some(foreground_task),
            config,
            handle,
            runtime: None,
        })
    }

    pub fn coordinator(&self) -> &LifecycleCoordinator {
        &self.coordinator
    }

    pub fn router(&self) -> &LaunchRouter {
        &self.router
    }

    pub fn events(&self) -> LifecycleEvents {
        self.events.clone()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Handle to the runtime background work runs on.
    pub fn runtime_handle(&self) -> Handle {
        self.handle.clone()
    }

    /// Current usage counters.
    pub fn usage(&self) -> UsageSnapshot {
        self.coordinator.metrics().snapshot()
    }

    /// Terminate the coordinator and stop the foreground loop.
    pub async fn shutdown(mut self) {
        info!("Shutting down TabHostApp");
        self.coordinator.on_will_terminate();
        self.foreground_shutdown.cancel();

        if let Some(task) = self.foreground_task.take() {
            if let Err(e) = task.await {
                warn!(error = %e, "Foreground loop ended abnormally");
            }
        }
        if let Some(runtime) = self.runtime.take() {
            runtime.shutdown_background();
        }
        info!("TabHostApp shutdown complete");
    }

    /// Blocking variant of [`shutdown`](Self::shutdown) for apps created
    /// with [`start_sync`](Self::start_sync).
    pub fn shutdown_sync(mut self) {
        info!("Shutting down TabHostApp");
        self.coordinator.on_will_terminate();
        self.foreground_shutdown.cancel();

        match (self.runtime.take(), self.foreground_task.take()) {
            (Some(runtime), Some(task)) => {
                if let Err(e) = runtime.block_on(task) {
                    warn!(error = %e, "Foreground loop ended abnormally");
                }
                runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT);
            }
            (Some(runtime), None) => runtime.shutdown_timeout(RUNTIME_SHUTDOWN_TIMEOUT),
            // The loop exits on its own once it sees the cancellation.
            (None, _) => {}
        }
        info!("TabHostApp shutdown complete");
    }
}
