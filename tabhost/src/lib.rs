//! TabHost - lifecycle coordination for a mobile browser shell
//!
//! This library owns the two pieces of an application lifecycle that are
//! genuinely concurrent:
//!
//! - The **background shutdown race**: when the host is about to lose CPU
//!   time, an optional sync-everything round trip races the OS-granted
//!   background budget, and the persistent store must be shut down exactly
//!   once, and only while the app is not in the foreground.
//! - The **deferred launch dispatcher**: external open requests that arrive
//!   while the app is not interactive are parked and replayed exactly once
//!   on the next activation.
//!
//! Everything else (UI, tabs, the sync protocol itself) is an injected
//! collaborator behind a trait.
//!
//! # Example
//!
//! ```ignore
//! use tabhost::launch::{LaunchConfig, LaunchRouter};
//! use tabhost::lifecycle::LifecycleCoordinator;
//!
//! let (coordinator, mut foreground) =
//!     LifecycleCoordinator::builder(sync, store, budget, launcher).build()?;
//! let router = LaunchRouter::new(LaunchConfig::default(), coordinator.clone());
//!
//! // Not active yet: the launch waits for activation.
//! router.route("tabhost://open-url?url=https://example.com");
//! coordinator.on_become_active();
//! foreground.drain();
//!
//! coordinator.on_will_resign_active();
//! coordinator.on_enter_background();
//! ```
//!
//! [`app::TabHostApp`] does this wiring for hosts that want the defaults.

pub mod app;
pub mod budget;
pub mod config;
pub mod events;
pub mod launch;
pub mod lifecycle;
pub mod log;
pub mod store;
pub mod sync;
pub mod telemetry;
pub mod testing;

/// Crate version, as reported by the CLI banner.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
