//! Scan a root directory of print runs and log the ingestion outcome of each.
//!
//! Outcomes go to the ingestion log (`prunt3d_ingest.log` by default); the
//! process exits 0 once every run has been looked at, regardless of how many
//! were skipped.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use prunt3d_ingest::exit_codes;
use prunt3d_ingest::ingest::{IngestOptions, Ingestor};
use prunt3d_ingest::io::config::{IngestConfig, load_config};
use prunt3d_ingest::io::run_log::IngestLog;
use prunt3d_ingest::logging;

#[derive(Parser)]
#[command(
    name = "prunt3d-ingest",
    version,
    about = "Validate and ingest 3D-print run folders"
)]
struct Cli {
    /// Directory whose immediate subdirectories are runs.
    root: PathBuf,

    /// TOML config file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Append the ingestion log here instead of the configured path.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let code = if err.use_stderr() {
                exit_codes::USAGE
            } else {
                exit_codes::OK
            };
            let _ = err.print();
            std::process::exit(code);
        }
    };
    logging::init();
    if let Err(err) = run(&cli) {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let cfg = resolve_config(cli)?;
    let mut log = IngestLog::append_to(&cfg.log_path)?
        .with_timestamp_format(cfg.timestamp_format.clone())?;
    let summary = Ingestor::baseline(IngestOptions::from(&cfg))
        .ingest(&cli.root, &mut log)
        .with_context(|| format!("ingest {}", cli.root.display()))?;
    println!(
        "ingest: runs={} ingested={} failed={} log={}",
        summary.total(),
        summary.ingested(),
        summary.failed(),
        cfg.log_path.display()
    );
    if let Some(first) = summary.log_errors.first() {
        eprintln!(
            "warning: {} log line(s) could not be written to {}: {}",
            summary.log_errors.len(),
            cfg.log_path.display(),
            first
        );
    }
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<IngestConfig> {
    let mut cfg = match &cli.config {
        Some(path) => load_config(path)?,
        None => IngestConfig::default(),
    };
    if let Some(log_file) = &cli.log_file {
        cfg.log_path = log_file.clone();
    }
    cfg.validate()?;
    Ok(cfg)
}
