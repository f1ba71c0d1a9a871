//! Next-page lookup for listing pages
//!
//! The storefront renders numbered pagination links:
//!
//! ```html
//! <a href="/eggs?page=2" class="page-link">2</a>
//! ```
//!
//! The link for page `n + 1` is the one whose text is exactly `n + 1`. When
//! enabled, an `<a rel="next">` link is accepted if no numbered link matches.

use crate::config::{compile_selector, PaginationSelectors};
use crate::scrape::extractor::element_text;
use crate::url::resolve_link;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Finds the URL of the following listing page
#[derive(Debug, Clone)]
pub struct Paginator {
    page_link: Selector,
    rel_next: Option<Selector>,
    base_url: Url,
}

impl Paginator {
    /// Creates a paginator
    ///
    /// # Arguments
    ///
    /// * `selectors` - Page link selector and rel=next switch
    /// * `base_url` - Origin that relative hrefs are resolved against
    pub fn new(selectors: &PaginationSelectors, base_url: Url) -> Result<Self, ConfigError> {
        let page_link = compile_selector("pagination.page-link", &selectors.page_link)?;
        let rel_next = if selectors.rel_next_fallback {
            Some(compile_selector("pagination.rel-next", r#"a[rel~="next"]"#)?)
        } else {
            None
        };

        Ok(Self {
            page_link,
            rel_next,
            base_url,
        })
    }

    /// Returns the URL of page `current_index + 1`, if the page links to it
    ///
    /// # Arguments
    ///
    /// * `document` - The current listing page
    /// * `current_index` - 1-based index of the current page
    ///
    /// # Returns
    ///
    /// * `Some(Url)` - Absolute URL of the next page
    /// * `None` - No qualifying link; the walk is over
    pub fn next_page(&self, document: &Html, current_index: u32) -> Option<Url> {
        let next = self
            .numbered_link(document, current_index)
            .or_else(|| self.rel_next_link(document));

        if next.is_none() {
            tracing::info!(
                "No more pages or specific next page link found after page {}.",
                current_index
            );
        }

        next
    }

    fn numbered_link(&self, document: &Html, current_index: u32) -> Option<Url> {
        let wanted = (current_index + 1).to_string();

        let link = document
            .select(&self.page_link)
            .find(|element| element_text(*element).as_deref() == Some(wanted.as_str()))?;

        self.resolve(link)
    }

    fn rel_next_link(&self, document: &Html) -> Option<Url> {
        let selector = self.rel_next.as_ref()?;
        let link = document.select(selector).next()?;
        self.resolve(link)
    }

    fn resolve(&self, link: ElementRef<'_>) -> Option<Url> {
        let href = link.value().attr("href")?;
        resolve_link(href, &self.base_url)
    }
}
