//! Conlog CLI
//!
//! Interactive debug console host for conlog-core. Type a command on stdin
//! and it runs on the next drain tick.
//!
//! ## Usage
//!
//! ```bash
//! # Start with defaults (~/.conlog/config.json if present)
//! conlog
//!
//! # Only warnings and errors, colored, drained every 10 ms
//! conlog --level warning --color --tick-ms 10
//!
//! # Serve files for `cat` and `ls` from ./assets
//! conlog --resource-dir assets
//! ```

mod shell;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use conlog_core::{ConsoleConfig, LogContext, LogLevel};
use tokio::sync::Notify;

use crate::shell::Shell;

/// Conlog - Interactive Debug Console
#[derive(Parser)]
#[command(name = "conlog")]
#[command(version = "0.1.0")]
#[command(about = "Conlog - Interactive Debug Console")]
#[command(
    long_about = "Leveled console logging with commands read from stdin and run on a fixed drain tick."
)]
struct Cli {
    /// Increase diagnostic verbosity on stderr (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Config file (default: ~/.conlog/config.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Minimum record level (info, debug, warning, error)
    #[arg(short, long)]
    level: Option<LogLevel>,

    /// Milliseconds between command drains
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u64).range(1..))]
    tick_ms: u64,

    /// Color records by level
    #[arg(long)]
    color: bool,

    /// Do not set the terminal title
    #[arg(long)]
    no_title: bool,

    /// Folder used by `cat` and `ls`
    #[arg(long)]
    resource_dir: Option<PathBuf>,
}

fn setup_logging(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

/// Get the default config file (~/.conlog/config.json)
fn default_config_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".conlog")
        .join("config.json")
}

fn load_file(path: &Path) -> Result<ConsoleConfig> {
    ConsoleConfig::load(path).with_context(|| format!("Failed to load config {}", path.display()))
}

/// Defaults, then config file, then environment, then flags.
fn build_config(cli: &Cli) -> Result<ConsoleConfig> {
    let base = match &cli.config {
        Some(path) => load_file(path)?,
        None => {
            let path = default_config_path();
            if path.is_file() {
                load_file(&path)?
            } else {
                ConsoleConfig::default()
            }
        }
    };

    let mut config = base
        .try_apply_env()
        .context("Invalid CONLOG_* environment variable")?
        // Ctrl-C is handled by the session loop
        .with_close_on_signal(false);
    if let Some(level) = cli.level {
        config = config.with_min_level(level);
    }
    if cli.color {
        config = config.with_color(true);
    }
    if cli.no_title {
        config = config.with_console_title(None);
    }
    if let Some(dir) = &cli.resource_dir {
        config = config.with_resource_dir(dir);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = build_config(&cli)?;
    tracing::debug!(?config, "Console configuration");

    let ctx = LogContext::new(config);
    let quit = Arc::new(Notify::new());
    {
        let quit = Arc::clone(&quit);
        ctx.set_on_close(move || {
            tracing::info!("Console closed");
            quit.notify_one();
        })?;
    }

    let shell = Shell::new(&ctx);
    shell.install();
    let reader = ctx
        .spawn_stdin_reader()
        .context("Failed to start console reader")?;

    let mut tick = tokio::time::interval(Duration::from_millis(cli.tick_ms));
    loop {
        tokio::select! {
            _ = tick.tick() => {
                // Checked before draining so the last lines read still run
                let input_done = reader.is_finished();
                ctx.process_commands();
                if input_done {
                    tracing::info!("Input closed, exiting");
                    break;
                }
            }
            _ = quit.notified() => {
                break;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Received shutdown signal");
                break;
            }
        }
    }

    ctx.close();
    Ok(())
}
