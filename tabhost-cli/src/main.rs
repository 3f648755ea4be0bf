//! TabHost CLI - Command-line interface
//!
//! Drives the TabHost lifecycle coordinator from the terminal: route single
//! launch requests, replay lifecycle scripts, and manage `config.ini`.

mod commands;
mod error;
mod runner;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::config::ConfigCommands;
use commands::route::RouteArgs;
use commands::simulate::SimulateArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "tabhost")]
#[command(about = "Browser lifecycle coordinator", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file and profile directory
    Init,

    /// Route a single launch request and show what would open
    Route {
        /// Launch URI (e.g., tabhost://open-url?url=https://example.com)
        uri: String,

        /// Route while the app is not yet active, so the launch is deferred
        #[arg(long)]
        inactive: bool,
    },

    /// Replay a lifecycle script against a simulated browser
    Simulate {
        /// Script file (reads stdin when omitted)
        script: Option<PathBuf>,

        /// Print events and the summary as JSON lines
        #[arg(long)]
        json: bool,

        /// Override the background budget in milliseconds
        #[arg(long)]
        budget_ms: Option<u64>,
    },

    /// View and modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let verbose = cli.verbose;
    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Route { uri, inactive } => commands::route::run(RouteArgs {
            uri,
            inactive,
            verbose,
        }),
        Commands::Simulate {
            script,
            json,
            budget_ms,
        } => commands::simulate::run(SimulateArgs {
            script,
            json,
            budget_ms,
            verbose,
        }),
        Commands::Config { command } => commands::config::run(command),
    }
}
