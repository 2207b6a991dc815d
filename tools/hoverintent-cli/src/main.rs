//! HoverIntent CLI: replay recorded pointer sessions through the tracker.
//!
//! Usage:
//!   hoverintent replay <SESSION>   Replay a session and print intent transitions
//!   hoverintent defaults           Show the effective registration defaults

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use hoverintent_common::config::{AppConfig, IntentDefaults};

mod commands;

#[derive(Parser)]
#[command(
    name = "hoverintent",
    about = "Detect deliberate hovers in recorded pointer sessions",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (defaults to $XDG_CONFIG_HOME/hoverintent/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a recorded session (JSONL) and report confirm/leave transitions
    Replay {
        /// Path to the session file
        path: PathBuf,

        /// Displacement threshold in pixels (overrides config)
        #[arg(long)]
        sensitivity: Option<f64>,

        /// Polling interval in milliseconds (overrides config)
        #[arg(long)]
        interval: Option<u64>,

        /// Leave delay in milliseconds (overrides config)
        #[arg(long)]
        timeout: Option<u64>,

        /// Write transitions to this JSONL file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Replay in real time through the async driver
        #[arg(long)]
        live: bool,
    },

    /// Show the effective registration defaults as JSON
    Defaults,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load(),
    };
    if cli.verbose {
        config.logging.level = "debug".to_string();
    }
    hoverintent_common::logging::init_logging(&config.logging)?;

    match cli.command {
        Commands::Replay {
            path,
            sensitivity,
            interval,
            timeout,
            output,
            live,
        } => {
            let defaults = IntentDefaults {
                sensitivity: sensitivity.unwrap_or(config.intent.sensitivity),
                interval_ms: interval.unwrap_or(config.intent.interval_ms),
                timeout_ms: timeout.unwrap_or(config.intent.timeout_ms),
            };
            commands::replay::run(path, defaults, output, live).await
        }
        Commands::Defaults => commands::defaults::run(&config),
    }
}
