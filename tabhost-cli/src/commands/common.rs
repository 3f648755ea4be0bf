//! Common types and utilities shared across CLI commands.

use console::style;
use tabhost::events::LifecycleEvent;
use tabhost::launch::{FxaIntent, LaunchHandler, LaunchIntent, RouteResult};
use tabhost::telemetry::UsageSnapshot;

/// Launch handler that prints what a browser would open.
#[derive(Debug, Default)]
pub struct ConsoleLauncher {
    json: bool,
}

impl ConsoleLauncher {
    pub fn new(json: bool) -> Self {
        Self { json }
    }
}

impl LaunchHandler for ConsoleLauncher {
    fn open_launch(&self, intent: &LaunchIntent) {
        if self.json {
            return;
        }
        let mode = if intent.is_private { " [private]" } else { "" };
        match &intent.target_url {
            Some(url) => println!("  {} open tab: {}{}", style("→").green(), url, mode),
            None => println!("  {} open blank tab{}", style("→").green(), mode),
        }
    }

    fn present_account_flow(&self, intent: &FxaIntent) {
        if self.json {
            return;
        }
        println!(
            "  {} account flow: {}{}",
            style("→").cyan(),
            intent.view,
            intent
                .email
                .as_deref()
                .map(|email| format!(" ({})", email))
                .unwrap_or_default()
        );
    }
}

/// One-line human description of a route result.
pub fn describe_route(result: &RouteResult) -> String {
    match result {
        RouteResult::Immediate(intent) => format!("Immediate: {}", intent),
        RouteResult::Deferred => "Deferred until the app is active".to_string(),
        RouteResult::SchemeRejected => "Rejected".to_string(),
    }
}

/// One-line human description of a lifecycle event.
pub fn describe_event(event: &LifecycleEvent) -> String {
    match event {
        LifecycleEvent::StateChanged { from, to } => format!("state {} → {}", from, to),
        LifecycleEvent::SyncStarted => "sync started".to_string(),
        LifecycleEvent::SyncFinished { ok: true } => "sync finished".to_string(),
        LifecycleEvent::SyncFinished { ok: false } => "sync failed".to_string(),
        LifecycleEvent::BudgetExpired => "background budget expired".to_string(),
        LifecycleEvent::StoreShutdown { reason } => format!("store shut down ({:?})", reason),
        LifecycleEvent::StoreShutdownSkipped { reason } => {
            format!("store shutdown skipped, app is active ({:?})", reason)
        }
        LifecycleEvent::StoreReopened => "store reopened".to_string(),
        LifecycleEvent::LaunchDeferred { intent } => format!("deferred: {}", intent),
        LifecycleEvent::LaunchExecuted { intent } => format!("executed: {}", intent),
        LifecycleEvent::AccountFlowPresented { intent } => format!("presented {}", intent),
    }
}

/// Print a usage summary block.
pub fn print_usage(usage: &UsageSnapshot) {
    println!();
    println!("Session Summary");
    println!("───────────────");
    println!(
        "  Foreground:       {} over {} session(s)",
        usage.foreground_human(),
        usage.foreground_sessions
    );
    println!(
        "  Syncs:            {} started, {} failed",
        usage.syncs_started, usage.syncs_failed
    );
    println!(
        "  Store shutdowns:  {} ({} skipped while active)",
        usage.store_shutdowns, usage.shutdowns_skipped
    );
    println!("  Budget expired:   {}", usage.budget_expirations);
    println!(
        "  Launches:         {} deferred, {} executed, {} account flow(s)",
        usage.launches_deferred, usage.launches_executed, usage.account_flows
    );
}
