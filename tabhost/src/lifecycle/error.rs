//! Lifecycle coordinator errors.

use thiserror::Error;

/// Errors raised while building a [`LifecycleCoordinator`](super::LifecycleCoordinator).
///
/// Runtime lifecycle handling itself never fails: sync failures are logged
/// and budget expiry is a scheduling signal.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// No tokio runtime handle was given and none is current.
    #[error("No Tokio runtime available for background sync: {0}")]
    NoRuntime(String),
}
