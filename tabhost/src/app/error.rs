//! Application error types.

use std::fmt;

use crate::lifecycle::LifecycleError;
use crate::store::StoreError;

/// Errors that can occur while starting the application.
#[derive(Debug)]
pub enum AppError {
    /// Failed to open the profile store.
    StoreOpen(StoreError),

    /// Failed to build the lifecycle coordinator.
    Lifecycle(LifecycleError),

    /// Configuration error.
    Config(String),

    /// Failed to create the Tokio runtime.
    RuntimeCreation(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::StoreOpen(e) => write!(f, "Failed to open profile store: {}", e),
            AppError::Lifecycle(e) => write!(f, "Failed to start lifecycle coordinator: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
            AppError::RuntimeCreation(msg) => {
                write!(f, "Failed to create Tokio runtime: {}", msg)
            }
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::StoreOpen(e) => Some(e),
            AppError::Lifecycle(e) => Some(e),
            AppError::Config(_) | AppError::RuntimeCreation(_) => None,
        }
    }
}

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        AppError::StoreOpen(e)
    }
}

impl From<LifecycleError> for AppError {
    fn from(e: LifecycleError) -> Self {
        AppError::Lifecycle(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_app_error_display() {
        let err = AppError::Config("no schemes registered".to_string());
        assert!(err.to_string().contains("Configuration error"));
        assert!(err.to_string().contains("no schemes registered"));
    }

    #[test]
    fn test_app_error_from_lifecycle_error() {
        let app_err: AppError = LifecycleError::NoRuntime("none".to_string()).into();
        assert!(matches!(app_err, AppError::Lifecycle(_)));
        assert!(app_err.source().is_some());
    }
}
