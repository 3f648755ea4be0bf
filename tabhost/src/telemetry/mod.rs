//! Usage telemetry for the lifecycle coordinator.
//!
//! This module counts what the coordinator did: foreground time, syncs,
//! store shutdowns, launches. It uses lock-free atomic counters so the
//! shutdown race can record from any thread without contending on the
//! coordinator's state lock.
//!
//! # Architecture
//!
//! ```text
//! LifecycleCoordinator ─────► UsageMetrics ─────► UsageSnapshot ─────► Views
//!                            (atomic counters)   (point-in-time copy)  (CLI, etc.)
//! ```
//!
//! # Example
//!
//! ```
//! use tabhost::telemetry::UsageMetrics;
//!
//! let metrics = UsageMetrics::new();
//! metrics.foreground_session_ended(42);
//! metrics.sync_finished(true);
//!
//! let snapshot = metrics.snapshot();
//! assert_eq!(snapshot.foreground_secs, 42);
//! assert_eq!(snapshot.syncs_failed, 0);
//! ```

mod clock;
mod metrics;
mod snapshot;

pub use clock::{Clock, ManualClock, SystemClock};
pub use metrics::UsageMetrics;
pub use snapshot::UsageSnapshot;
