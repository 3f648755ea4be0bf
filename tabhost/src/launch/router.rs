//! Launch request routing.

use std::collections::HashMap;

use tracing::{debug, info, warn};
use url::Url;

use super::error::LaunchError;
use super::intent::{FxaIntent, Intent, LaunchIntent, ShortcutAction};
use super::LaunchConfig;
use crate::lifecycle::{LaunchDisposition, LifecycleCoordinator};

/// Literal values of the `private` parameter that mean "yes".
const TRUE_LITERALS: &[&str] = &["true", "1", "yes"];

/// Outcome of routing one external request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteResult {
    /// Execute now, on the calling foreground thread.
    Immediate(Intent),
    /// Stored; executes on the next activation.
    Deferred,
    /// Refused. Nothing changed.
    SchemeRejected,
}

impl RouteResult {
    /// Whether the OS should be told the request was handled.
    pub fn is_accepted(&self) -> bool {
        !matches!(self, RouteResult::SchemeRejected)
    }
}

/// Parse a raw external request into an [`Intent`].
///
/// Only an unparseable request or an unregistered scheme is an error; bad
/// `url` or `private` values degrade to a blank tab and `false`.
pub fn parse_request(raw: &str, config: &LaunchConfig) -> Result<Intent, LaunchError> {
    let request =
        Url::parse(raw.trim()).map_err(|_| LaunchError::MalformedRequest(raw.to_string()))?;

    if !config.accepts_scheme(request.scheme()) {
        return Err(LaunchError::SchemeRejected(request.scheme().to_string()));
    }

    let mut params: HashMap<String, String> = HashMap::new();
    for (key, value) in request.query_pairs() {
        params
            .entry(key.into_owned())
            .or_insert_with(|| value.into_owned());
    }

    if let Some(view) = params.remove("fxa") {
        return Ok(Intent::Fxa(FxaIntent {
            view,
            email: params.remove("email").filter(|v| !v.is_empty()),
            access_code: params.remove("access_code").filter(|v| !v.is_empty()),
        }));
    }

    let is_private = params
        .get("private")
        .map(|value| is_true_literal(value))
        .unwrap_or(false);

    Ok(Intent::Launch(LaunchIntent::from_raw_target(
        params.get("url").map(String::as_str),
        is_private,
    )))
}

fn is_true_literal(value: &str) -> bool {
    let value = value.trim();
    TRUE_LITERALS
        .iter()
        .any(|literal| literal.eq_ignore_ascii_case(value))
}

/// Routes external requests against the coordinator's activation state.
#[derive(Debug, Clone)]
pub struct LaunchRouter {
    config: LaunchConfig,
    coordinator: LifecycleCoordinator,
}

impl LaunchRouter {
    pub fn new(config: LaunchConfig, coordinator: LifecycleCoordinator) -> Self {
        Self {
            config,
            coordinator,
        }
    }

    pub fn config(&self) -> &LaunchConfig {
        &self.config
    }

    /// Route a custom-scheme URL.
    pub fn route(&self, raw: &str) -> RouteResult {
        match parse_request(raw, &self.config) {
            Ok(Intent::Fxa(fxa)) => {
                info!(view = %fxa.view, "Routing account flow request");
                RouteResult::Immediate(Intent::Fxa(fxa))
            }
            Ok(Intent::Launch(intent)) => self.submit(intent),
            Err(e) => {
                warn!(request = raw, error = %e, "Rejecting launch request");
                RouteResult::SchemeRejected
            }
        }
    }

    /// Route a home-screen shortcut.
    pub fn route_shortcut(&self, action: ShortcutAction) -> RouteResult {
        debug!(?action, "Routing shortcut");
        self.submit(action.into())
    }

    /// Route a tap on a local notification with an optional `url` payload.
    pub fn route_notification(&self, payload: Option<&str>) -> RouteResult {
        self.submit(LaunchIntent::from_notification_payload(payload))
    }

    /// Route a continued web browsing activity.
    pub fn route_web_activity(&self, raw: &str) -> RouteResult {
        match LaunchIntent::from_web_activity(raw) {
            Ok(intent) => self.submit(intent),
            Err(e) => {
                warn!(activity = raw, error = %e, "Rejecting web activity");
                RouteResult::SchemeRejected
            }
        }
    }

    /// Schedule an immediate result on the coordinator's foreground queue.
    ///
    /// The launch handler runs on the next foreground turn, after any
    /// pending launch that activation already replayed. Returns `true` if
    /// something was scheduled.
    pub fn dispatch(&self, result: &RouteResult) -> bool {
        match result {
            RouteResult::Immediate(intent) => self.coordinator.execute(intent),
            RouteResult::Deferred | RouteResult::SchemeRejected => false,
        }
    }

    fn submit(&self, intent: LaunchIntent) -> RouteResult {
        match self.coordinator.submit_launch(intent) {
            LaunchDisposition::Immediate(intent) => {
                info!(intent = %intent, "Routing launch for immediate execution");
                RouteResult::Immediate(Intent::Launch(intent))
            }
            LaunchDisposition::Deferred => RouteResult::Deferred,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::ManualBudget;
    use crate::lifecycle::ForegroundLoop;
    use crate::testing::{GatedSync, RecordingLauncher, RecordingStore};
    use proptest::prelude::*;
    use std::sync::Arc;

    fn parse(raw: &str) -> Result<Intent, LaunchError> {
        parse_request(raw, &LaunchConfig::default())
    }

    fn router() -> (LaunchRouter, ForegroundLoop, Arc<RecordingLauncher>) {
        let launcher = Arc::new(RecordingLauncher::new());
        let (coordinator, foreground) = LifecycleCoordinator::builder(
            Arc::new(GatedSync::new(false)),
            Arc::new(RecordingStore::new()),
            Arc::new(ManualBudget::new()),
            launcher.clone(),
        )
        .build()
        .unwrap();
        (
            LaunchRouter::new(LaunchConfig::default(), coordinator),
            foreground,
            launcher,
        )
    }

    #[test]
    fn test_parse_url_and_private() {
        let intent = parse("tabhost://open-url?url=https://example.com&private=true").unwrap();
        assert_eq!(
            intent,
            Intent::Launch(LaunchIntent::new(
                Some(Url::parse("https://example.com").unwrap()),
                true
            ))
        );
    }

    #[test]
    fn test_parse_private_literals() {
        for value in ["true", "TRUE", "1", "yes", " Yes "] {
            let raw = format!("tabhost://open-url?private={}", value);
            match parse(&raw).unwrap() {
                Intent::Launch(intent) => assert!(intent.is_private, "{:?}", value),
                other => panic!("unexpected intent: {:?}", other),
            }
        }
        for value in ["false", "0", "no", "", "on"] {
            let raw = format!("tabhost://open-url?private={}", value);
            match parse(&raw).unwrap() {
                Intent::Launch(intent) => assert!(!intent.is_private, "{:?}", value),
                other => panic!("unexpected intent: {:?}", other),
            }
        }
    }

    #[test]
    fn test_parse_bad_url_degrades_to_blank() {
        assert_eq!(
            parse("tabhost://open-url?url=not%20a%20url").unwrap(),
            Intent::Launch(LaunchIntent::blank(false))
        );
        assert_eq!(
            parse("tabhost://open-url?url=javascript:alert(1)").unwrap(),
            Intent::Launch(LaunchIntent::blank(false))
        );
    }

    #[test]
    fn test_parse_first_occurrence_wins() {
        let intent = parse("tabhost://open-url?private=yes&private=no").unwrap();
        assert_eq!(intent, Intent::Launch(LaunchIntent::blank(true)));
    }

    #[test]
    fn test_parse_fxa() {
        let intent = parse("tabhost://fxa-signin?fxa=signin&email=a%40b.c&access_code=").unwrap();
        assert_eq!(
            intent,
            Intent::Fxa(FxaIntent {
                view: "signin".to_string(),
                email: Some("a@b.c".to_string()),
                access_code: None,
            })
        );
    }

    #[test]
    fn test_parse_scheme_rejected() {
        assert_eq!(
            parse("mailto:someone@example.com"),
            Err(LaunchError::SchemeRejected("mailto".to_string()))
        );
        assert!(matches!(
            parse("no scheme here"),
            Err(LaunchError::MalformedRequest(_))
        ));
    }

    #[test]
    fn test_parse_scheme_case_insensitive() {
        assert!(parse("TABHOST://open-url").is_ok());
    }

    #[tokio::test]
    async fn test_route_rejected_changes_nothing() {
        let (router, _foreground, _launcher) = router();
        assert_eq!(router.route("https://example.com"), RouteResult::SchemeRejected);
        assert!(router.coordinator.pending_launch().is_none());
        assert!(!RouteResult::SchemeRejected.is_accepted());
    }

    #[tokio::test]
    async fn test_route_fxa_never_deferred() {
        let (router, _foreground, _launcher) = router();
        let result = router.route("tabhost://fxa?fxa=signin");
        assert!(matches!(result, RouteResult::Immediate(Intent::Fxa(_))));
        assert!(router.coordinator.pending_launch().is_none());
    }

    #[tokio::test]
    async fn test_route_while_inactive_defers() {
        let (router, _foreground, _launcher) = router();
        assert_eq!(
            router.route("tabhost://open-url?url=https://a.example"),
            RouteResult::Deferred
        );
        assert_eq!(
            router.route_shortcut(ShortcutAction::NewPrivateTab),
            RouteResult::Deferred
        );
        // Last wins
        assert_eq!(
            router.coordinator.pending_launch(),
            Some(LaunchIntent::blank(true))
        );
    }

    #[tokio::test]
    async fn test_route_while_active_dispatches_on_next_turn() {
        let (router, mut foreground, launcher) = router();
        router.coordinator.on_become_active();

        let result = router.route_notification(Some("https://news.example/story"));
        assert!(router.dispatch(&result));
        assert_eq!(foreground.drain(), 1);
        assert_eq!(launcher.launches().len(), 1);
        assert!(!router.dispatch(&RouteResult::Deferred));
    }

    #[tokio::test]
    async fn test_route_web_activity_rejects_non_http() {
        let (router, _foreground, _launcher) = router();
        assert_eq!(
            router.route_web_activity("file:///etc/passwd"),
            RouteResult::SchemeRejected
        );
        assert_eq!(
            router.route_web_activity("https://example.com"),
            RouteResult::Deferred
        );
    }

    proptest! {
        #[test]
        fn prop_private_is_false_unless_true_literal(value in "[a-z0-9]{0,8}") {
            prop_assume!(!TRUE_LITERALS.contains(&value.as_str()));
            let raw = format!("tabhost://open-url?private={}", value);
            match parse(&raw).unwrap() {
                Intent::Launch(intent) => prop_assert!(!intent.is_private),
                other => prop_assert!(false, "unexpected intent: {:?}", other),
            }
        }

        #[test]
        fn prop_url_field_never_rejects(value in "[ -~]{0,24}") {
            let request = Url::parse_with_params("tabhost://open-url", &[("url", value.as_str())])
                .unwrap();
            prop_assert!(matches!(parse(request.as_str()), Ok(Intent::Launch(_))));
        }
    }
}
