//! Scrape orchestrator - the fetch, extract, paginate loop
//!
//! This module drives one run:
//! - A single-product start URL is fetched and extracted once
//! - A listing start URL is walked page by page up to the page limit
//! - Records from every page are accumulated in order
//! - A fixed politeness delay separates successive fetches
//!
//! No failure inside the loop is fatal. A failed fetch ends the walk and
//! keeps whatever was already collected.

use crate::config::Config;
use crate::scrape::extractor::ProductExtractor;
use crate::scrape::fetcher::{FetchedPage, PageFetcher};
use crate::scrape::paginator::Paginator;
use crate::scrape::record::ProductRecord;
use crate::url::{PageContext, PageKind};
use crate::ConfigError;
use std::time::Duration;
use url::Url;

/// Why a run stopped advancing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Start URL was a product page; nothing to paginate
    SingleProduct,
    /// The last page had no link to a following page
    NoNextPage,
    /// The configured page limit was reached
    PageLimit,
    /// A page could not be fetched
    FetchFailed,
}

/// Result of one run
#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    /// Every record found, in page order
    pub records: Vec<ProductRecord>,
    /// Number of successful page fetches
    pub pages_fetched: u32,
    pub stop_reason: StopReason,
}

/// Drives the fetcher, extractor and paginator for one run
pub struct ScrapeOrchestrator<F: PageFetcher> {
    fetcher: F,
    extractor: ProductExtractor,
    paginator: Paginator,
    page_delay: Duration,
}

impl<F: PageFetcher> ScrapeOrchestrator<F> {
    /// Creates an orchestrator from its parts
    pub fn new(
        fetcher: F,
        extractor: ProductExtractor,
        paginator: Paginator,
        page_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            paginator,
            page_delay,
        }
    }

    /// Creates an orchestrator from configuration
    ///
    /// # Arguments
    ///
    /// * `config` - Selectors, placeholder, base URL and page delay are read from here
    /// * `fetcher` - Page source (the HTTP fetcher in production)
    ///
    /// # Returns
    ///
    /// * `Ok(ScrapeOrchestrator)` - Ready to run
    /// * `Err(ConfigError)` - A selector or the base URL is invalid
    pub fn from_config(config: &Config, fetcher: F) -> Result<Self, ConfigError> {
        let extractor = ProductExtractor::new(
            &config.selectors,
            config.scrape.placeholder.as_str(),
            config.scrape.product_url_marker.as_str(),
        )?;

        let base_url = Url::parse(&config.scrape.base_url).map_err(|e| {
            ConfigError::InvalidUrl(format!(
                "Invalid base-url '{}': {}",
                config.scrape.base_url, e
            ))
        })?;
        let paginator = Paginator::new(&config.selectors.pagination, base_url)?;

        Ok(Self::new(
            fetcher,
            extractor,
            paginator,
            Duration::from_millis(config.scrape.page_delay_ms),
        ))
    }

    /// Runs a scrape starting at `start_url`
    ///
    /// # Arguments
    ///
    /// * `start_url` - First page; a product URL short-circuits to one fetch
    /// * `max_pages` - Upper bound on listing pages fetched (ignored for products)
    ///
    /// # Returns
    ///
    /// The accumulated records and why the run stopped. Never fails.
    pub async fn run(&self, start_url: &str, max_pages: u32) -> ScrapeOutcome {
        tracing::info!("Starting scraping...");

        let outcome = match self.extractor.page_kind(start_url) {
            PageKind::SingleProduct => self.run_single(start_url).await,
            PageKind::Listing => self.run_listing(start_url, max_pages).await,
        };

        tracing::info!(
            "Finished scraping. Total products found: {} ({} pages, stopped: {:?})",
            outcome.records.len(),
            outcome.pages_fetched,
            outcome.stop_reason
        );

        outcome
    }

    async fn run_single(&self, url: &str) -> ScrapeOutcome {
        match self.fetcher.fetch(url).await {
            Ok(page) => {
                let document = page.document();
                let record = self.extractor.extract_single(&document, &page.url);
                ScrapeOutcome {
                    records: vec![record],
                    pages_fetched: 1,
                    stop_reason: StopReason::SingleProduct,
                }
            }
            Err(e) => {
                tracing::warn!("Product page fetch failed: {}", e);
                ScrapeOutcome {
                    records: Vec::new(),
                    pages_fetched: 0,
                    stop_reason: StopReason::FetchFailed,
                }
            }
        }
    }

    async fn run_listing(&self, start_url: &str, max_pages: u32) -> ScrapeOutcome {
        let mut records = Vec::new();
        let mut current = Some(start_url.to_string());
        let mut index: u32 = 1;
        let mut pages_fetched: u32 = 0;

        let stop_reason = loop {
            let Some(url) = current.take() else {
                break StopReason::NoNextPage;
            };

            if index > max_pages {
                tracing::info!("Reached page limit of {}; not fetching {}", max_pages, url);
                break StopReason::PageLimit;
            }

            tracing::info!("Scraping page {}: {}", index, url);

            let page = match self.fetcher.fetch(&url).await {
                Ok(page) => page,
                Err(e) => {
                    tracing::warn!("Stopping after page {}: {}", index - 1, e);
                    break StopReason::FetchFailed;
                }
            };
            pages_fetched += 1;

            let context = PageContext {
                kind: self.extractor.page_kind(&page.url),
                url: page.url.clone(),
                index,
            };
            let (found, next) = self.process_page(&page, &context);
            tracing::info!("Page {} yielded {} products", context.index, found.len());
            records.extend(found);

            current = next.map(String::from);
            index += 1;

            if current.is_some() && index <= max_pages && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        };

        ScrapeOutcome {
            records,
            pages_fetched,
            stop_reason,
        }
    }

    /// Extracts records and finds the next page from a single parse
    ///
    /// Kept synchronous so the document never lives across an await. A page
    /// that turns out to be a product page ends the walk.
    fn process_page(
        &self,
        page: &FetchedPage,
        context: &PageContext,
    ) -> (Vec<ProductRecord>, Option<Url>) {
        let document = page.document();
        let records = self.extractor.extract(&document, &context.url);
        let next = if context.kind.paginates() {
            self.paginator.next_page(&document, context.index)
        } else {
            None
        };
        (records, next)
    }
}
