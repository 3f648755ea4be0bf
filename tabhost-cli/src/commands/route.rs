//! Route command - parse and route a single launch request.

use std::sync::Arc;

use tabhost::app::{Collaborators, TabHostApp};
use tabhost::budget::ManualBudget;
use tabhost::launch::RouteResult;
use tabhost::sync::DisabledSync;
use tabhost::testing::RecordingStore;

use super::common::{describe_route, ConsoleLauncher};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the route command.
pub struct RouteArgs {
    pub uri: String,
    pub inactive: bool,
    pub verbose: bool,
}

/// Run the route command.
///
/// Routes against a fresh coordinator with no sync engine and an in-memory
/// store, so nothing on disk is touched.
pub fn run(args: RouteArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("route");

    let collaborators = Collaborators::new(
        Arc::new(DisabledSync),
        Arc::new(RecordingStore::new()),
        Arc::new(ConsoleLauncher::new(false)),
    )
    .with_budget(Arc::new(ManualBudget::new()));
    let app = TabHostApp::start_sync(runner.app_config(), collaborators)?;

    if !args.inactive {
        app.coordinator().on_become_active();
    }
    println!("App state: {}", app.coordinator().state());

    let result = app.router().route(&args.uri);
    println!("{}", describe_route(&result));

    match &result {
        RouteResult::Immediate(_) => {
            app.router().dispatch(&result);
        }
        RouteResult::Deferred => {
            if let Some(pending) = app.coordinator().pending_launch() {
                println!("  pending: {}", pending);
            }
        }
        RouteResult::SchemeRejected => {}
    }

    app.shutdown_sync();

    if result == RouteResult::SchemeRejected {
        return Err(CliError::Rejected(args.uri));
    }
    Ok(())
}
