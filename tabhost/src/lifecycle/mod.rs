//! Application lifecycle coordination.
//!
//! The [`LifecycleCoordinator`] receives OS lifecycle notifications and owns
//! the two concurrent decisions the app makes around them:
//!
//! - whether and when to shut the persistent store down after entering the
//!   background (racing a sync round trip against the background budget),
//! - whether an external launch executes now or waits for activation.
//!
//! Deferred work that touches the UI runs on the [`ForegroundLoop`] returned
//! from [`CoordinatorBuilder::build`].

mod coordinator;
mod error;
mod foreground;
mod state;
mod ticket;

pub use coordinator::{CoordinatorBuilder, LaunchDisposition, LifecycleCoordinator};
pub use error::LifecycleError;
pub use foreground::{foreground_queue, ForegroundLoop, ForegroundQueue, ForegroundTask};
pub use state::LifecycleState;
