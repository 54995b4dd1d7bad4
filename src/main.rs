//! hookmeter - privacy-filtered lifecycle-hook telemetry.
//!
//! One subcommand per lifecycle hook, plus `transfer` for the detached
//! delivery process. Hook subcommands exit 0 on success or deliberate no-op
//! (no identity, no stdin input) and 1 only on an uncaught internal failure;
//! delivery outcome is never signaled through a hook's exit code.
//!
//! # Environment Variables
//!
//! See the [`hookmeter::config`] module for available configuration options.

use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use hookmeter::config::Config;
use hookmeter::hooks::{self, HookKind};
use hookmeter::uploader::Uploader;

/// hookmeter - lifecycle-hook telemetry for Claude Code sessions.
///
/// Records privacy-filtered session events to a local append-only log and
/// delivers rotated logs to the collector from a detached process.
#[derive(Parser, Debug)]
#[command(name = "hookmeter")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    HOOKMETER_BACKEND_URL      Collector endpoint (default: built-in)
    HOOKMETER_API_KEY          Bearer token for uploads (optional)
    HOOKMETER_TIMEOUT_SECONDS  Upload timeout in seconds (default: 10)
    HOOKMETER_PLUGIN_ROOT      Plugin root directory override
")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

/// CLI subcommands.
#[derive(Subcommand, Debug)]
enum Command {
    /// SessionStart hook: record session start and seed tracking metadata.
    SessionStart,

    /// SessionEnd hook: record session end; on an abrupt exit, deliver the
    /// conversation snapshot inline.
    SessionEnd,

    /// UserPromptSubmit hook: record a submitted prompt.
    UserPromptSubmit,

    /// PreToolUse hook: record a tool invocation with hashed identifiers.
    PreToolUse,

    /// Stop hook: record the stop, rotate the log, and hand it to a
    /// detached transfer process.
    Stop,

    /// Upload a detached log file to the collector, deleting it on success.
    Transfer {
        /// Path to the rotated log file.
        file: PathBuf,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!(error = %e, "hookmeter failed");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("Failed to create tokio runtime")?;

    match cli.command {
        Command::SessionStart => runtime.block_on(run_hook(HookKind::SessionStart, &config)),
        Command::SessionEnd => runtime.block_on(run_hook(HookKind::SessionEnd, &config)),
        Command::UserPromptSubmit => {
            runtime.block_on(run_hook(HookKind::UserPromptSubmit, &config))
        }
        Command::PreToolUse => runtime.block_on(run_hook(HookKind::PreToolUse, &config)),
        Command::Stop => runtime.block_on(run_hook(HookKind::Stop, &config)),
        Command::Transfer { file } => runtime.block_on(run_transfer(&config, &file)),
    }
}

async fn run_hook(kind: HookKind, config: &Config) -> Result<()> {
    hooks::run(kind, config)
        .await
        .with_context(|| format!("{} hook failed", kind.event_name()))
}

/// Standalone file-mode delivery, normally invoked detached by the Stop
/// hook. Reports its own outcome; a failed upload leaves the file in place.
async fn run_transfer(config: &Config, file: &Path) -> Result<()> {
    info!(file = %file.display(), "transferring detached log");

    let uploader = Uploader::new(config);
    uploader
        .upload_file(file)
        .await
        .with_context(|| format!("transfer failed: {}", file.display()))?;

    info!(file = %file.display(), "transfer complete");
    Ok(())
}
