//! Integration tests for external launch routing.
//!
//! These tests verify the complete launch flow:
//! - raw request → router → immediate execution or pending slot
//! - activation → foreground turn → exactly-once execution
//! - rejected and account-flow requests never touching the pending slot
//!
//! Run with: `cargo test --test deferred_launch`

use std::sync::Arc;

use url::Url;

use tabhost::budget::ManualBudget;
use tabhost::events::LifecycleEvent;
use tabhost::launch::{
    FxaIntent, Intent, LaunchConfig, LaunchIntent, LaunchRouter, RouteResult, ShortcutAction,
};
use tabhost::lifecycle::{ForegroundLoop, LifecycleCoordinator};
use tabhost::testing::{GatedSync, RecordingLauncher, RecordingStore};

// ============================================================================
// Helper Functions
// ============================================================================

const EXAMPLE_REQUEST: &str = "tabhost://open-url?url=https://example.com&private=true";

struct Harness {
    coordinator: LifecycleCoordinator,
    router: LaunchRouter,
    foreground: ForegroundLoop,
    launcher: Arc<RecordingLauncher>,
}

fn harness() -> Harness {
    let launcher = Arc::new(RecordingLauncher::new());
    let (coordinator, foreground) = LifecycleCoordinator::builder(
        Arc::new(GatedSync::new(false)),
        Arc::new(RecordingStore::new()),
        Arc::new(ManualBudget::new()),
        launcher.clone(),
    )
    .build()
    .unwrap();
    let router = LaunchRouter::new(LaunchConfig::default(), coordinator.clone());

    Harness {
        coordinator,
        router,
        foreground,
        launcher,
    }
}

fn example_intent() -> LaunchIntent {
    LaunchIntent::new(Some(Url::parse("https://example.com").unwrap()), true)
}

// ============================================================================
// Active app
// ============================================================================

#[tokio::test]
async fn test_active_request_is_immediate() {
    let mut h = harness();
    h.coordinator.on_become_active();

    let result = h.router.route(EXAMPLE_REQUEST);
    assert_eq!(result, RouteResult::Immediate(Intent::Launch(example_intent())));
    assert!(h.coordinator.pending_launch().is_none());

    assert!(h.router.dispatch(&result));
    assert_eq!(h.foreground.drain(), 1);
    assert_eq!(h.launcher.launches(), vec![example_intent()]);
}

#[tokio::test]
async fn test_replayed_launch_precedes_launch_routed_after_activation() {
    let mut h = harness();

    assert_eq!(
        h.router.route("tabhost://open-url?url=https://first.example"),
        RouteResult::Deferred
    );
    h.coordinator.on_become_active();

    let result = h.router.route("tabhost://open-url?url=https://second.example");
    assert!(matches!(result, RouteResult::Immediate(_)));
    assert!(h.router.dispatch(&result));

    assert_eq!(h.foreground.drain(), 2);
    let urls: Vec<_> = h
        .launcher
        .launches()
        .iter()
        .map(|intent| intent.target_url.as_ref().map(|url| url.to_string()))
        .collect();
    assert_eq!(
        urls,
        vec![
            Some("https://first.example/".to_string()),
            Some("https://second.example/".to_string()),
        ]
    );
}

// ============================================================================
// Inactive app
// ============================================================================

#[tokio::test]
async fn test_inactive_request_runs_once_on_activation() {
    let mut h = harness();

    assert_eq!(h.router.route(EXAMPLE_REQUEST), RouteResult::Deferred);
    assert_eq!(h.coordinator.pending_launch(), Some(example_intent()));

    h.coordinator.on_become_active();
    h.foreground.drain();
    assert_eq!(h.launcher.launches(), vec![example_intent()]);

    // A second activation with nothing new performs no launch.
    h.coordinator.on_will_resign_active();
    h.coordinator.on_become_active();
    assert_eq!(h.foreground.drain(), 0);
    assert_eq!(h.launcher.launches().len(), 1);
}

#[tokio::test]
async fn test_last_deferred_request_wins() {
    let mut h = harness();

    h.router.route("tabhost://open-url?url=https://first.example");
    h.router.route("tabhost://open-url?url=https://second.example");

    h.coordinator.on_become_active();
    h.foreground.drain();

    let launches = h.launcher.launches();
    assert_eq!(launches.len(), 1);
    assert_eq!(
        launches[0].target_url.as_ref().map(Url::as_str),
        Some("https://second.example/")
    );
    assert_eq!(h.coordinator.metrics().snapshot().launches_deferred, 2);
}

#[tokio::test]
async fn test_mixed_sources_share_the_pending_slot() {
    let mut h = harness();

    h.router.route(EXAMPLE_REQUEST);
    h.router.route_notification(Some("https://news.example/story"));
    h.router.route_shortcut(ShortcutAction::NewTab);

    h.coordinator.on_become_active();
    h.foreground.drain();
    assert_eq!(h.launcher.launches(), vec![LaunchIntent::blank(false)]);
}

#[tokio::test]
async fn test_request_while_backgrounded_waits_for_full_resume() {
    let mut h = harness();
    h.coordinator.on_become_active();
    h.coordinator.on_will_resign_active();
    h.coordinator.on_enter_background();

    assert_eq!(h.router.route(EXAMPLE_REQUEST), RouteResult::Deferred);

    h.coordinator.on_will_enter_foreground();
    assert_eq!(h.foreground.drain(), 0);

    h.coordinator.on_become_active();
    assert_eq!(h.foreground.drain(), 1);
    assert_eq!(h.launcher.launches(), vec![example_intent()]);
}

// ============================================================================
// Rejected and account-flow requests
// ============================================================================

#[tokio::test]
async fn test_unknown_scheme_mutates_nothing() {
    let h = harness();
    let mut events = h.coordinator.events().subscribe();

    h.router.route(EXAMPLE_REQUEST);
    let pending = h.coordinator.pending_launch();
    let _ = events.try_recv();

    let result = h.router.route("otherapp://open-url?url=https://evil.example");
    assert_eq!(result, RouteResult::SchemeRejected);
    assert_eq!(h.coordinator.pending_launch(), pending);
    assert!(events.try_recv().is_err());
    assert_eq!(h.coordinator.metrics().snapshot().launches_deferred, 1);
}

#[tokio::test]
async fn test_fxa_is_immediate_even_while_inactive() {
    let mut h = harness();
    h.router.route(EXAMPLE_REQUEST);

    let result = h.router.route("tabhost://fxa-signin?fxa=signin&email=someone%40example.com");
    let expected = FxaIntent {
        view: "signin".to_string(),
        email: Some("someone@example.com".to_string()),
        access_code: None,
    };
    assert_eq!(result, RouteResult::Immediate(Intent::Fxa(expected.clone())));

    // The pending launch is untouched.
    assert_eq!(h.coordinator.pending_launch(), Some(example_intent()));

    assert!(h.router.dispatch(&result));
    assert_eq!(h.foreground.drain(), 1);
    assert_eq!(h.launcher.account_flows(), vec![expected]);
    assert!(h.launcher.launches().is_empty());
}

#[tokio::test]
async fn test_execution_is_published() {
    let mut h = harness();
    let mut events = h.coordinator.events().subscribe();

    h.router.route(EXAMPLE_REQUEST);
    h.coordinator.on_become_active();
    h.foreground.drain();

    let mut seen = Vec::new();
    while let Ok(event) = events.try_recv() {
        seen.push(event);
    }
    let deferred = seen
        .iter()
        .position(|e| matches!(e, LifecycleEvent::LaunchDeferred { .. }))
        .unwrap();
    let executed = seen
        .iter()
        .position(|e| matches!(e, LifecycleEvent::LaunchExecuted { .. }))
        .unwrap();
    assert!(deferred < executed);
}
