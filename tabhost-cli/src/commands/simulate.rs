//! Simulate command - drive the coordinator through a lifecycle script.
//!
//! A script is one command per line; blank lines and `#` comments are
//! ignored:
//!
//! ```text
//! open tabhost://open-url?url=https://example.com
//! activate
//! resign
//! background
//! wait 2500
//! foreground
//! activate
//! ```

use std::fmt;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use console::style;
use tokio::sync::broadcast::{self, error::TryRecvError};
use tracing::{info, warn};

use tabhost::app::{Collaborators, TabHostApp};
use tabhost::events::LifecycleEvent;
use tabhost::launch::ShortcutAction;

use super::common::{describe_event, describe_route, print_usage, ConsoleLauncher};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Granularity of `wait` so Ctrl+C and events are handled promptly.
const WAIT_SLICE: Duration = Duration::from_millis(50);

/// Arguments for the simulate command.
pub struct SimulateArgs {
    pub script: Option<PathBuf>,
    pub json: bool,
    pub budget_ms: Option<u64>,
    pub verbose: bool,
}

/// One script command.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Activate,
    Resign,
    Background,
    Foreground,
    Terminate,
    Open(String),
    Shortcut(ShortcutAction),
    Notify(Option<String>),
    Handoff(String),
    Wait(Duration),
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Step::Activate => write!(f, "activate"),
            Step::Resign => write!(f, "resign"),
            Step::Background => write!(f, "background"),
            Step::Foreground => write!(f, "foreground"),
            Step::Terminate => write!(f, "terminate"),
            Step::Open(uri) => write!(f, "open {}", uri),
            Step::Shortcut(ShortcutAction::NewTab) => write!(f, "shortcut new-tab"),
            Step::Shortcut(ShortcutAction::NewPrivateTab) => write!(f, "shortcut new-private-tab"),
            Step::Shortcut(ShortcutAction::OpenUrl(url)) => write!(f, "shortcut {}", url),
            Step::Notify(Some(url)) => write!(f, "notify {}", url),
            Step::Notify(None) => write!(f, "notify"),
            Step::Handoff(url) => write!(f, "handoff {}", url),
            Step::Wait(duration) => write!(f, "wait {}", duration.as_millis()),
        }
    }
}

/// Parse a whole script.
pub fn parse_script(text: &str) -> Result<Vec<Step>, CliError> {
    let mut steps = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let step = parse_line(line).map_err(|message| CliError::Script {
            line: index + 1,
            message,
        })?;
        steps.extend(step);
    }
    Ok(steps)
}

fn parse_line(line: &str) -> Result<Option<Step>, String> {
    // `#` only starts a comment at line start or after whitespace; URLs
    // may carry fragments.
    let line = match line.find(" #") {
        Some(index) => &line[..index],
        None => line,
    }
    .trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (command, rest) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };
    let argument = |name: &str| {
        if rest.is_empty() {
            Err(format!("'{}' needs an argument", name))
        } else {
            Ok(rest.to_string())
        }
    };

    let step = match command.to_ascii_lowercase().as_str() {
        "activate" => Step::Activate,
        "resign" => Step::Resign,
        "background" => Step::Background,
        "foreground" => Step::Foreground,
        "terminate" => Step::Terminate,
        "open" => Step::Open(argument("open")?),
        "shortcut" => Step::Shortcut(
            argument("shortcut")?
                .parse::<ShortcutAction>()
                .map_err(|e| e.to_string())?,
        ),
        "notify" => Step::Notify((!rest.is_empty()).then(|| rest.to_string())),
        "handoff" => Step::Handoff(argument("handoff")?),
        "wait" => {
            let ms: u64 = argument("wait")?
                .parse()
                .map_err(|_| format!("'wait' expects milliseconds, got '{}'", rest))?;
            Step::Wait(Duration::from_millis(ms))
        }
        other => return Err(format!("unknown command '{}'", other)),
    };
    Ok(Some(step))
}

/// A running simulation.
struct Simulation {
    app: TabHostApp,
    events: broadcast::Receiver<LifecycleEvent>,
    json: bool,
    interrupted: Arc<AtomicBool>,
}

impl Simulation {
    fn interrupted(&self) -> bool {
        self.interrupted.load(Ordering::SeqCst)
    }

    fn run_step(&mut self, step: &Step) {
        if let Step::Wait(duration) = step {
            self.wait(*duration);
            return;
        }

        let coordinator = self.app.coordinator();
        let router = self.app.router();
        let result = match step {
            Step::Activate => {
                coordinator.on_become_active();
                None
            }
            Step::Resign => {
                coordinator.on_will_resign_active();
                None
            }
            Step::Background => {
                coordinator.on_enter_background();
                None
            }
            Step::Foreground => {
                coordinator.on_will_enter_foreground();
                None
            }
            Step::Terminate => {
                coordinator.on_will_terminate();
                None
            }
            Step::Open(uri) => Some(router.route(uri)),
            Step::Shortcut(action) => Some(router.route_shortcut(action.clone())),
            Step::Notify(payload) => Some(router.route_notification(payload.as_deref())),
            Step::Handoff(url) => Some(router.route_web_activity(url)),
            Step::Wait(_) => None,
        };

        if let Some(result) = result {
            if !self.json {
                println!("  {}", describe_route(&result));
            }
            router.dispatch(&result);
        }
        self.print_events();
    }

    fn wait(&mut self, duration: Duration) {
        let deadline = Instant::now() + duration;
        while !self.interrupted() {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            std::thread::sleep(WAIT_SLICE.min(deadline - now));
            self.print_events();
        }
    }

    fn print_events(&mut self) {
        loop {
            match self.events.try_recv() {
                Ok(event) => print_event(&event, self.json),
                Err(TryRecvError::Lagged(missed)) => {
                    warn!(missed, "Event printer fell behind");
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => break,
            }
        }
    }
}

fn print_event(event: &LifecycleEvent, json: bool) {
    if json {
        match serde_json::to_string(event) {
            Ok(line) => println!("{}", line),
            Err(e) => warn!(error = %e, "Failed to serialize event"),
        }
    } else {
        println!("  {} {}", style("•").dim(), describe_event(event));
    }
}

fn read_script(path: Option<&PathBuf>) -> Result<String, CliError> {
    match path {
        Some(path) => std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read script {}: {}", path.display(), e))
        }),
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            Ok(text)
        }
    }
}

/// Run the simulate command.
pub fn run(args: SimulateArgs) -> Result<(), CliError> {
    let runner = CliRunner::new(args.verbose)?;
    runner.log_startup("simulate");

    let steps = parse_script(&read_script(args.script.as_ref())?)?;

    let mut config = runner.app_config();
    if let Some(ms) = args.budget_ms {
        config = config.with_budget_duration(Duration::from_millis(ms));
    }
    if !args.json {
        println!("TabHost Lifecycle Simulation v{}", tabhost::VERSION);
        println!("==============================");
        println!();
        println!("Profile:  {}", config.profile_dir.display());
        println!("Budget:   {} ms", config.budget.duration.as_millis());
        println!(
            "Sync:     {}",
            if config.sync.has_account {
                format!("{} ms per round trip", config.sync.duration.as_millis())
            } else {
                "no account".to_string()
            }
        );
        println!("Steps:    {}", steps.len());
        println!();
    }

    let collaborators =
        Collaborators::simulated(&config, Arc::new(ConsoleLauncher::new(args.json)))?;
    let app = TabHostApp::start_sync(config, collaborators)?;
    let metrics = app.coordinator().metrics();

    let interrupted = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&interrupted);
    ctrlc::set_handler(move || flag.store(true, Ordering::SeqCst))
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

    let events = app.events().subscribe();
    let mut simulation = Simulation {
        app,
        events,
        json: args.json,
        interrupted,
    };

    for (index, step) in steps.iter().enumerate() {
        if simulation.interrupted() {
            break;
        }
        if !args.json {
            println!("{} {}", style(format!("[{}]", index + 1)).bold(), step);
        }
        simulation.run_step(step);
    }

    if simulation.interrupted() {
        info!("Interrupted; terminating");
        if !args.json {
            println!();
            println!("Received interrupt, terminating...");
        }
    }

    let Simulation {
        app, mut events, ..
    } = simulation;
    app.shutdown_sync();
    while let Ok(event) = events.try_recv() {
        print_event(&event, args.json);
    }

    let usage = metrics.snapshot();
    if args.json {
        println!("{}", serde_json::json!({ "summary": usage }));
    } else {
        print_usage(&usage);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_script() {
        let steps = parse_script(
            "# cold start from a link\n\
             open tabhost://open-url?url=https://example.com\n\
             \n\
             activate\n\
             shortcut new-private-tab\n\
             notify\n\
             wait 250  # let the sync run\n\
             BACKGROUND\n",
        )
        .unwrap();

        assert_eq!(
            steps,
            vec![
                Step::Open("tabhost://open-url?url=https://example.com".to_string()),
                Step::Activate,
                Step::Shortcut(ShortcutAction::NewPrivateTab),
                Step::Notify(None),
                Step::Wait(Duration::from_millis(250)),
                Step::Background,
            ]
        );
    }

    #[test]
    fn test_parse_errors_carry_line_numbers() {
        let err = parse_script("activate\nfly away\n").unwrap_err();
        assert!(matches!(err, CliError::Script { line: 2, .. }));

        assert!(parse_script("wait soon").is_err());
        assert!(parse_script("open").is_err());
        assert!(parse_script("shortcut reading-list").is_err());
    }

    #[test]
    fn test_step_display_round_trips() {
        for line in ["activate", "open tabhost://x", "wait 10", "shortcut new-tab"] {
            let step = parse_line(line).unwrap().unwrap();
            assert_eq!(step.to_string(), line);
        }
    }
}
