//! Application lifecycle states.

use std::fmt;

use serde::Serialize;

/// Where the app is in its OS-driven lifecycle.
///
/// ```text
/// Inactive ──become_active──► Active ──resign_active──► Inactive
///     │                                                    │
///     └────────────enter_background────────────────────────┤
///                                                          ▼
///                                               EnteringBackground
///                                                          │ settled
///                                                          ▼
/// Inactive ◄──────────will_enter_foreground──────── Backgrounded
/// ```
///
/// Only OS notifications move the state; nothing transitions itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    /// Launched or resuming, not yet interactive.
    Inactive,
    /// Interactive, in the foreground.
    Active,
    /// Left the foreground; the background transition is still running.
    EnteringBackground,
    /// Background transition settled.
    Backgrounded,
}

impl LifecycleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleState::Inactive => "inactive",
            LifecycleState::Active => "active",
            LifecycleState::EnteringBackground => "entering-background",
            LifecycleState::Backgrounded => "backgrounded",
        }
    }

    /// Whether the app is in the background, settled or not.
    pub fn is_background(&self) -> bool {
        matches!(
            self,
            LifecycleState::EnteringBackground | LifecycleState::Backgrounded
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_background() {
        assert!(!LifecycleState::Inactive.is_background());
        assert!(!LifecycleState::Active.is_background());
        assert!(LifecycleState::EnteringBackground.is_background());
        assert!(LifecycleState::Backgrounded.is_background());
    }

    #[test]
    fn test_display() {
        assert_eq!(
            LifecycleState::EnteringBackground.to_string(),
            "entering-background"
        );
    }
}
