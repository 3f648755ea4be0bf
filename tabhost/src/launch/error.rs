//! Launch routing errors.

use thiserror::Error;

/// Reasons an external request is refused.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LaunchError {
    /// The request's scheme is not one of the app's registered schemes.
    #[error("Unrecognized URL scheme '{0}'")]
    SchemeRejected(String),

    /// The request is not a URI at all.
    #[error("Malformed launch request: {0}")]
    MalformedRequest(String),

    /// A continued activity carried a non-web URL.
    #[error("Cannot continue activity with scheme '{0}'")]
    UnsupportedActivity(String),

    /// Unknown home-screen shortcut type.
    #[error("Unknown shortcut '{0}'")]
    UnknownShortcut(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_error_display() {
        let err = LaunchError::SchemeRejected("mailto".to_string());
        assert!(err.to_string().contains("mailto"));

        let err = LaunchError::UnknownShortcut("x".to_string());
        assert_eq!(err.to_string(), "Unknown shortcut 'x'");
    }
}
