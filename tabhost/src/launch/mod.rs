//! External launch routing.
//!
//! Turns the ways the OS can ask the app to open something (custom-scheme
//! URLs, home-screen shortcuts, notification taps, continued web activities)
//! into a normalized [`Intent`], then either hands it back for immediate
//! execution or parks it in the coordinator's pending slot until the app is
//! interactive.
//!
//! # Routing
//!
//! ```text
//! raw URI ──► scheme allow-list ──► rejected ──► SchemeRejected
//!                   │
//!                   ▼
//!             fxa param? ──► yes ──► Immediate(Fxa)      (never deferred)
//!                   │
//!                   ▼ no
//!             LaunchIntent { url?, private }
//!                   │
//!                   ▼
//!             app Active? ──► yes ──► Immediate(Launch)
//!                   │
//!                   ▼ no
//!             pending slot (last wins) ──► Deferred
//! ```

mod error;
mod intent;
mod router;

pub use error::LaunchError;
pub use intent::{FxaIntent, Intent, LaunchIntent, ShortcutAction};
pub use router::{parse_request, LaunchRouter, RouteResult};

/// Schemes registered by default.
pub const DEFAULT_SCHEMES: &[&str] = &["tabhost", "tabhost-x-callback"];

/// Executes launch intents on the UI surface.
///
/// Implemented by the host shell. Calls always arrive on the foreground
/// context: immediate and deferred launches alike run from the
/// coordinator's foreground queue, in the order they were scheduled.
pub trait LaunchHandler: Send + Sync {
    /// Open a tab for the intent.
    fn open_launch(&self, intent: &LaunchIntent);

    /// Present the account sign-in flow.
    fn present_account_flow(&self, intent: &FxaIntent);
}

/// Configuration for [`LaunchRouter`].
#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// URL schemes the app is registered for. Compared case-insensitively.
    pub schemes: Vec<String>,
}

impl Default for LaunchConfig {
    fn default() -> Self {
        Self {
            schemes: DEFAULT_SCHEMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl LaunchConfig {
    /// Replace the registered schemes.
    pub fn with_schemes<I, S>(mut self, schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.schemes = schemes.into_iter().map(Into::into).collect();
        self
    }

    /// Whether `scheme` is registered.
    pub fn accepts_scheme(&self, scheme: &str) -> bool {
        self.schemes.iter().any(|s| s.eq_ignore_ascii_case(scheme))
    }
}
