//! Shelf-Scrape main entry point
//!
//! This is the command-line interface for the Shelf-Scrape batch job.

use anyhow::Context;
use clap::Parser;
use shelf_scrape::config::{load_config_with_hash, Config, SheetConfig};
use shelf_scrape::scrape::scrape;
use shelf_scrape::sink::{deliver, GoogleSheetsSink, RecordSink, SinkResult, StdoutSink};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Shelf-Scrape: grocery listing scraper
///
/// Fetches product listing pages, extracts name/price/unit for every
/// product, and appends the rows to a Google Sheets worksheet. Intended to
/// be run periodically by an external scheduler.
#[derive(Parser, Debug)]
#[command(name = "shelf-scrape")]
#[command(version)]
#[command(about = "Scrape grocery listings into a spreadsheet", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults if omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Override the start URL
    #[arg(long, value_name = "URL")]
    start_url: Option<String>,

    /// Override the maximum number of listing pages
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_pages: Option<u32>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Scrape and print the records without writing to the spreadsheet
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // A .env file is optional; the credential usually comes from the scheduler
    if let Ok(path) = dotenvy::dotenv() {
        tracing::debug!("Loaded environment from {}", path.display());
    }

    let config = load_effective_config(&cli)?;

    let outcome = scrape(&config).await.context("Failed to start scraping")?;

    match deliver(&outcome.records, || open_sink(cli.dry_run, &config.sheet)).await {
        Ok(_) => Ok(()),
        Err(e) => {
            tracing::error!("Failed to write to Google Sheet: {}", e);
            Err(e.into())
        }
    }
}

/// Picks the destination: stdout for dry runs, otherwise the configured sheet
fn open_sink(dry_run: bool, sheet: &SheetConfig) -> SinkResult<Box<dyn RecordSink>> {
    if dry_run {
        return Ok(Box::new(StdoutSink));
    }

    tracing::info!("Setting up Google Sheets client...");
    let sink = GoogleSheetsSink::from_env(sheet).map_err(|e| {
        tracing::error!("Error setting up Google Sheets client: {}", e);
        e
    })?;
    Ok(Box::new(sink))
}

/// Loads the config file (if any) and applies CLI overrides
fn load_effective_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given; using built-in defaults");
            Config::default()
        }
    };

    if let Some(start_url) = &cli.start_url {
        config.scrape.start_url = start_url.clone();
    }
    if let Some(max_pages) = cli.max_pages {
        config.scrape.max_pages = max_pages;
    }

    // Overrides bypass the file loader, so check the merged result again
    shelf_scrape::config::validate(&config).context("Invalid configuration")?;

    tracing::info!(
        "Start URL: {}, max pages: {}, destination: '{}' / '{}'",
        config.scrape.start_url,
        config.scrape.max_pages,
        config.sheet.spreadsheet,
        config.sheet.worksheet
    );

    Ok(config)
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("shelf_scrape=info,warn"),
            1 => EnvFilter::new("shelf_scrape=debug,info"),
            2 => EnvFilter::new("shelf_scrape=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}
