//! Scrape module for page fetching and product extraction
//!
//! This module contains the core scraping logic, including:
//! - HTTP fetching with a fixed browser user agent
//! - Product extraction for single-product and listing pages
//! - Numbered pagination lookup
//! - The orchestrating fetch/extract/paginate loop

mod extractor;
mod fetcher;
mod orchestrator;
mod paginator;
mod record;

pub use extractor::{element_text, normalize_text, ProductExtractor};
pub use fetcher::{build_http_client, fetch_url, FetchedPage, HttpFetcher, PageFetcher};
pub use orchestrator::{ScrapeOrchestrator, ScrapeOutcome, StopReason};
pub use paginator::Paginator;
pub use record::{ProductRecord, HEADER};

use crate::config::Config;
use crate::ScrapeError;

/// Runs a complete scrape with the production HTTP fetcher
///
/// This is the main entry point for a batch run. It will:
/// 1. Build the HTTP client
/// 2. Compile the configured selectors
/// 3. Walk the start URL up to the page limit
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(ScrapeOutcome)` - Run finished (possibly with zero records)
/// * `Err(ScrapeError)` - Client or selector setup failed; nothing was fetched
pub async fn scrape(config: &Config) -> Result<ScrapeOutcome, ScrapeError> {
    let fetcher = HttpFetcher::new(&config.scrape)?;
    let orchestrator = ScrapeOrchestrator::from_config(config, fetcher)?;
    Ok(orchestrator
        .run(&config.scrape.start_url, config.scrape.max_pages)
        .await)
}
