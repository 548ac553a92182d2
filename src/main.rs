//! sitewatch CLI
//!
//! One run per invocation; schedule it externally.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use sitewatch::config::{WatchConfig, DEFAULT_CONFIG_PATH};
use sitewatch::detection::{HttpFetcher, LineDiffer, SystemClock};
use sitewatch::logging::{self, Profile};
use sitewatch::store::SnapshotStore;
use sitewatch::watch::{notify, WatchCoordinator};

#[derive(Debug, Parser)]
#[command(name = "sitewatch")]
#[command(version, about = "Fetch a resource and notify when it changed since the last run", long_about = None)]
struct Cli {
    /// Resource to watch, e.g. https://example.com/page
    locator: String,

    /// Configuration file
    #[arg(long, env = "SITEWATCH_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Override the storage root from the configuration
    #[arg(long)]
    storage: Option<PathBuf>,

    /// Emit JSON structured logs
    #[arg(long)]
    json_logs: bool,

    /// Write the run report as JSON to this file on success
    #[arg(long, value_name = "PATH")]
    report: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    logging::init(if cli.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    if let Err(e) = run(cli) {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = WatchConfig::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(storage) = cli.storage {
        config.path = storage;
    }

    let fetcher = HttpFetcher::new(&config.fetch).context("building HTTP client")?;
    let coordinator = WatchCoordinator::new(
        SnapshotStore::new(&config.path),
        fetcher,
        LineDiffer,
        SystemClock,
        notify::from_config(&config.notify),
    );

    let report = coordinator
        .run(&cli.locator)
        .with_context(|| format!("watching {}", cli.locator))?;

    if let Some(path) = cli.report {
        report
            .write_json(&path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }
    Ok(())
}
