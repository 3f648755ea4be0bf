//! Normalized launch requests.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use url::Url;

use super::error::LaunchError;

/// URL schemes never opened from an external request.
const BLOCKED_TARGET_SCHEMES: &[&str] = &["javascript", "data"];

/// "Open this URL, or a blank tab, in this privacy mode."
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchIntent {
    /// Page to open. `None` opens a blank tab.
    pub target_url: Option<Url>,

    /// Whether the tab opens in private browsing mode.
    pub is_private: bool,
}

impl LaunchIntent {
    pub fn new(target_url: Option<Url>, is_private: bool) -> Self {
        Self {
            target_url,
            is_private,
        }
    }

    /// A blank tab.
    pub fn blank(is_private: bool) -> Self {
        Self::new(None, is_private)
    }

    /// Build an intent from a raw `url` field, degrading to a blank tab when
    /// the value is not an openable URL.
    pub fn from_raw_target(raw: Option<&str>, is_private: bool) -> Self {
        Self::new(raw.and_then(parse_target_url), is_private)
    }

    /// Build an intent from a local notification's `url` payload.
    pub fn from_notification_payload(payload: Option<&str>) -> Self {
        Self::from_raw_target(payload, false)
    }

    /// Build an intent from a continued web browsing activity.
    ///
    /// Only `http` and `https` pages can be handed off.
    pub fn from_web_activity(raw: &str) -> Result<Self, LaunchError> {
        let url = Url::parse(raw).map_err(|_| LaunchError::MalformedRequest(raw.to_string()))?;
        match url.scheme() {
            "http" | "https" => Ok(Self::new(Some(url), false)),
            other => Err(LaunchError::UnsupportedActivity(other.to_string())),
        }
    }
}

impl fmt::Display for LaunchIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mode = if self.is_private { "private" } else { "normal" };
        match &self.target_url {
            Some(url) => write!(f, "open {} ({})", url, mode),
            None => write!(f, "open blank tab ({})", mode),
        }
    }
}

/// Request to present the account sign-in flow.
///
/// Never deferred: it presents a modal flow rather than opening a tab.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FxaIntent {
    /// Which screen of the flow to show (e.g. `signin`).
    pub view: String,
    pub email: Option<String>,
    pub access_code: Option<String>,
}

impl fmt::Display for FxaIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "account flow '{}'", self.view)
    }
}

/// Any request the router can produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    Launch(LaunchIntent),
    Fxa(FxaIntent),
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Intent::Launch(intent) => fmt::Display::fmt(intent, f),
            Intent::Fxa(intent) => fmt::Display::fmt(intent, f),
        }
    }
}

/// Home-screen quick actions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortcutAction {
    NewTab,
    NewPrivateTab,
    OpenUrl(Url),
}

impl From<ShortcutAction> for LaunchIntent {
    fn from(action: ShortcutAction) -> Self {
        match action {
            ShortcutAction::NewTab => LaunchIntent::blank(false),
            ShortcutAction::NewPrivateTab => LaunchIntent::blank(true),
            ShortcutAction::OpenUrl(url) => LaunchIntent::new(Some(url), false),
        }
    }
}

impl FromStr for ShortcutAction {
    type Err = LaunchError;

    /// Parses `new-tab`, `new-private-tab`, or an absolute URL.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new-tab" => Ok(ShortcutAction::NewTab),
            "new-private-tab" => Ok(ShortcutAction::NewPrivateTab),
            other => parse_target_url(other)
                .map(ShortcutAction::OpenUrl)
                .ok_or_else(|| LaunchError::UnknownShortcut(other.to_string())),
        }
    }
}

/// Parse a target URL, rejecting schemes that must never be opened.
pub(crate) fn parse_target_url(raw: &str) -> Option<Url> {
    let url = Url::parse(raw.trim()).ok()?;
    if BLOCKED_TARGET_SCHEMES.contains(&url.scheme()) {
        return None;
    }
    Some(url)
}
