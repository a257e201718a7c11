//! CLI entry point for the newspaper harvester.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context, Result};
use clap::Parser;
use kb_harvester::harvester::Harvester;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::MakeWriterExt;

mod cli;

use cli::Args;

// Requests never overlap, so one thread is all the runtime needs.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Parse CLI arguments first (before tracing, so --help works without logs)
    let args = Args::parse();

    init_tracing(&args)?;

    debug!(?args, "CLI arguments parsed");
    info!(ppn = %args.ppn, dir = %args.dir.display(), "KB harvester starting");

    let harvester = Harvester::new(args.to_config())
        .await
        .context("failed to set up harvester")?;

    let stats = harvester
        .run(&args.ppn, args.discover(), args.work_source())
        .await
        .with_context(|| format!("harvest of PPN {} failed", args.ppn))?;

    info!(
        urls = stats.urls_discovered(),
        issues = stats.issues_completed(),
        protocol_errors = stats.protocol_errors(),
        retrieval_errors = stats.retrieval_errors(),
        incomplete = stats.incomplete_issues(),
        assets_downloaded = stats.assets_downloaded(),
        assets_skipped = stats.assets_skipped(),
        assets_failed = stats.assets_failed(),
        integrity_warnings = stats.integrity_warnings(),
        "Harvest complete"
    );

    Ok(())
}

/// Installs the global subscriber.
///
/// Priority: `RUST_LOG` env var > quiet flag > verbose flag > default (info).
fn init_tracing(args: &Args) -> Result<()> {
    let default_level = if args.quiet {
        "error"
    } else {
        match args.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    };
    let filter = || EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    match args.log_file.as_deref() {
        Some(path) => {
            let file = open_log_file(path)?;
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_ansi(false)
                .with_writer(std::io::stderr.and(Mutex::new(file)))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter())
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn open_log_file(path: &Path) -> Result<std::fs::File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))
}
