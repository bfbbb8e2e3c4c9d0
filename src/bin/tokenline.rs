//! tokenline - three-line status line for Claude Code
//!
//! Claude Code runs this binary after every assistant message, piping the
//! session's status JSON to stdin, and shows whatever it prints.
//!
//! # Usage
//!
//! ```text
//! tokenline              # Render the status line from stdin
//! tokenline --dry-run    # Render without writing the usage ledger
//! tokenline usage        # Show the rolling usage windows
//! tokenline setup        # Configure Claude Code's statusLine
//! tokenline uninstall    # Remove the statusLine entry
//! ```

use std::fs::{self, OpenOptions};
use std::io::IsTerminal;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tokio::io::AsyncReadExt;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use tokenline_cli::config::Config;
use tokenline_cli::paths;
use tokenline_cli::render::{no_color_requested, Painter};
use tokenline_cli::setup;
use tokenline_cli::store::{JsonFileStore, LedgerStore, MemoryStore};
use tokenline_cli::tracker::{UsageSummary, UsageTracker};
use tokenline_cli::run_status;

/// Environment variable holding the log filter.
const LOG_ENV: &str = "TOKENLINE_LOG";

/// Filter used when `TOKENLINE_LOG` is unset or invalid.
const DEFAULT_LOG_FILTER: &str = "tokenline=warn";

// ============================================================================
// CLI Arguments
// ============================================================================

/// tokenline - Claude Code status line with rolling token usage
#[derive(Parser, Debug)]
#[command(name = "tokenline")]
#[command(about = "Three-line Claude Code status line with 5h and 7d usage estimates")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Config file (defaults to $XDG_CONFIG_HOME/tokenline/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    /// Track usage in memory only; the ledger on disk is read but not written
    #[arg(long)]
    dry_run: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show the rolling usage windows without recording anything
    Usage {
        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },
    /// Configure Claude Code to use tokenline as its status line
    Setup,
    /// Remove tokenline from Claude Code's settings
    Uninstall,
}

// ============================================================================
// Logging Setup
// ============================================================================

fn create_log_file() -> Option<std::fs::File> {
    let log_path = paths::log_file_path();

    if let Some(log_dir) = log_path.parent() {
        if let Err(e) = fs::create_dir_all(log_dir) {
            eprintln!("Warning: Failed to create log directory {log_dir:?}: {e}");
            return None;
        }
    }

    match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(file) => Some(file),
        Err(e) => {
            eprintln!("Warning: Failed to open log file {log_path:?}: {e}");
            None
        }
    }
}

/// Logs go to a file; stdout belongs to Claude Code.
fn init_logging() {
    if let Some(file) = create_log_file() {
        let writer = Mutex::new(file);
        let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(writer)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("off"))
            .init();
    }
}

// ============================================================================
// Commands
// ============================================================================

fn load_config(explicit: Option<PathBuf>) -> Config {
    let path = Config::resolve_path(explicit);
    let mut config = Config::load_or_default(path.as_deref());
    config.apply_env();
    config.normalize_limits();
    config
}

async fn read_stdin() -> String {
    if std::io::stdin().is_terminal() {
        debug!("stdin is a terminal, rendering without a payload");
        return String::new();
    }

    let mut input = String::new();
    if let Err(e) = tokio::io::stdin().read_to_string(&mut input).await {
        warn!(error = %e, "Failed to read stdin");
    }
    input
}

async fn render_status<S: LedgerStore>(store: S, config: &Config, color: bool) -> Result<()> {
    let tracker = UsageTracker::from_config(store, &config.limits)?;
    let input = read_stdin().await;
    let home = dirs::home_dir();

    let output = run_status(
        &input,
        config,
        &tracker,
        Painter::new(color),
        home.as_deref(),
        Utc::now(),
    )
    .await;

    for line in &output.lines {
        println!("{line}");
    }
    Ok(())
}

fn show_usage(config: &Config, json: bool) -> Result<()> {
    let store = JsonFileStore::new(config.store_path());
    let tracker = UsageTracker::from_config(store, &config.limits)?;
    let report = tracker.current(Utc::now());

    if json {
        let summary = UsageSummary::from(&report);
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    println!("Ledger: {}", tracker.store().path().display());
    for window in [&report.short, &report.long] {
        println!(
            "  {:<4} {:>4} of limit, {} tokens in {} events, resets in {}",
            window.label,
            window.stats.format_percentage(),
            window.stats.total_tokens,
            window.stats.event_count,
            window.stats.format_remaining(),
        );
    }
    println!("  {} sessions tracked", report.session_count);
    Ok(())
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Handle subcommands that only touch settings first
    match args.command {
        Some(Command::Setup) => return setup::setup(),
        Some(Command::Uninstall) => return setup::uninstall(),
        _ => {}
    }

    init_logging();

    let config = load_config(args.config);

    if let Some(Command::Usage { json }) = args.command {
        return show_usage(&config, json);
    }

    let color = !args.no_color && config.display.color && !no_color_requested();
    info!(dry_run = args.dry_run, color, "tokenline starting");

    let file_store = JsonFileStore::new(config.store_path());
    if args.dry_run {
        let ledger = file_store.load().unwrap_or_default();
        render_status(MemoryStore::with_ledger(ledger), &config, color).await
    } else {
        render_status(file_store, &config, color).await
    }
}
