//! Product extraction from parsed pages
//!
//! The extractor turns a document into product records using the
//! field-to-selector mapping from the configuration. Which selector set
//! applies depends on the page kind:
//!
//! - **Single product**: one name, one price, one amount element anywhere in
//!   the document; always exactly one record.
//! - **Listing**: every element matching the container selector is one
//!   product card. If none match, the fallback container selector is tried
//!   once. Fields are then looked up inside each card.
//!
//! A missing field never drops a record. It is filled with the placeholder.

use crate::config::{compile_selector, ListingSelectors, ProductSelectors, SelectorConfig};
use crate::scrape::record::ProductRecord;
use crate::url::PageKind;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};

/// Compiled selectors for one record's three fields
#[derive(Debug, Clone)]
struct FieldSelectors {
    name: Selector,
    price: Selector,
    amount: Selector,
}

/// Extracts [`ProductRecord`]s from product and listing pages
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    product: FieldSelectors,
    container: Selector,
    fallback_container: Selector,
    listing: FieldSelectors,
    placeholder: String,
    product_marker: String,
}

impl ProductExtractor {
    /// Compiles the configured selectors
    ///
    /// # Arguments
    ///
    /// * `selectors` - Field-to-selector mapping
    /// * `placeholder` - Text written for fields that are not found
    /// * `product_marker` - URL substring that marks a single-product page
    ///
    /// # Returns
    ///
    /// * `Ok(ProductExtractor)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector did not parse
    pub fn new(
        selectors: &SelectorConfig,
        placeholder: impl Into<String>,
        product_marker: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            product: compile_product(&selectors.product)?,
            container: compile_selector("listing.container", &selectors.listing.container)?,
            fallback_container: compile_selector(
                "listing.fallback-container",
                &selectors.listing.fallback_container,
            )?,
            listing: compile_listing(&selectors.listing)?,
            placeholder: placeholder.into(),
            product_marker: product_marker.into(),
        })
    }

    /// The placeholder written for missing fields
    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Classifies a URL with this extractor's product marker
    pub fn page_kind(&self, url: &str) -> PageKind {
        PageKind::classify(url, &self.product_marker)
    }

    /// Extracts all records from a document
    ///
    /// # Arguments
    ///
    /// * `document` - The parsed page
    /// * `source_url` - The URL the page was fetched from; selects the mode
    ///
    /// # Returns
    ///
    /// Zero or more records. Zero means no product cards were found, which is
    /// not an error.
    pub fn extract(&self, document: &Html, source_url: &str) -> Vec<ProductRecord> {
        match self.page_kind(source_url) {
            PageKind::SingleProduct => vec![self.extract_single(document, source_url)],
            PageKind::Listing => self.extract_listing(document, source_url),
        }
    }

    /// Single-product mode: one record from document-wide lookups
    pub fn extract_single(&self, document: &Html, source_url: &str) -> ProductRecord {
        let root = document.root_element();
        let record = self.extract_fields(root, &self.product, source_url);

        tracing::info!(
            "Found on single product page: {}, {}, {}",
            record.name,
            record.price,
            record.amount
        );

        record
    }

    /// Listing mode: one record per product card
    pub fn extract_listing(&self, document: &Html, source_url: &str) -> Vec<ProductRecord> {
        let mut containers: Vec<ElementRef> = document.select(&self.container).collect();

        if containers.is_empty() {
            containers = document.select(&self.fallback_container).collect();
            tracing::info!(
                "No primary product containers on {}; fallback selector found {}",
                source_url,
                containers.len()
            );
        }

        if containers.is_empty() {
            tracing::warn!(
                "No product containers found on {}. The listing markup may have changed.",
                source_url
            );
            return Vec::new();
        }

        let records: Vec<ProductRecord> = containers
            .into_iter()
            .map(|container| self.extract_fields(container, &self.listing, source_url))
            .inspect(|record| {
                tracing::debug!("Found: {}, {}, {}", record.name, record.price, record.amount)
            })
            .collect();

        let partial = records
            .iter()
            .filter(|record| record.is_partial(&self.placeholder))
            .count();
        if partial > 0 {
            tracing::warn!(
                "{} of {} products on {} are missing fields",
                partial,
                records.len(),
                source_url
            );
        }

        records
    }

    fn extract_fields(
        &self,
        scope: ElementRef<'_>,
        fields: &FieldSelectors,
        source_url: &str,
    ) -> ProductRecord {
        ProductRecord {
            name: self.field_text(scope, &fields.name, "name", source_url),
            price: self.field_text(scope, &fields.price, "price", source_url),
            amount: self.field_text(scope, &fields.amount, "amount", source_url),
        }
    }

    /// Text of the first element matching `selector` inside `scope`, or the placeholder
    fn field_text(
        &self,
        scope: ElementRef<'_>,
        selector: &Selector,
        field: &str,
        source_url: &str,
    ) -> String {
        match scope.select(selector).next().and_then(element_text) {
            Some(text) => text,
            None => {
                tracing::debug!("No {} element on {}", field, source_url);
                self.placeholder.clone()
            }
        }
    }
}

fn compile_product(selectors: &ProductSelectors) -> Result<FieldSelectors, ConfigError> {
    Ok(FieldSelectors {
        name: compile_selector("product.name", &selectors.name)?,
        price: compile_selector("product.price", &selectors.price)?,
        amount: compile_selector("product.amount", &selectors.amount)?,
    })
}

fn compile_listing(selectors: &ListingSelectors) -> Result<FieldSelectors, ConfigError> {
    Ok(FieldSelectors {
        name: compile_selector("listing.name", &selectors.name)?,
        price: compile_selector("listing.price", &selectors.price)?,
        amount: compile_selector("listing.amount", &selectors.amount)?,
    })
}

/// Normalized visible text of an element, None if it is blank
pub fn element_text(element: ElementRef<'_>) -> Option<String> {
    let raw: String = element.text().collect();
    let text = normalize_text(&raw);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Collapses whitespace runs to single spaces and trims the ends
///
/// Non-breaking spaces (U+00A0) count as whitespace.
///
/// # Examples
///
/// ```
/// use shelf_scrape::scrape::normalize_text;
///
/// assert_eq!(normalize_text("  Eggs\u{a0}12\u{a0}pcs \n"), "Eggs 12 pcs");
/// ```
pub fn normalize_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
