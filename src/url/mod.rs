//! URL handling for Shelf-Scrape
//!
//! This module classifies page URLs (single product vs listing) and resolves
//! pagination hrefs against the storefront origin.

use ::url::Url;

/// The two page shapes the extractor understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// A product detail page: exactly one record, never paginated
    SingleProduct,
    /// A category or search listing: many cards, may paginate
    Listing,
}

impl PageKind {
    /// Classifies a URL by checking whether it contains the product marker
    ///
    /// This is a plain substring test. A listing URL whose query happens to
    /// contain the marker (e.g. `?from=/product/`) is classified as a single
    /// product.
    ///
    /// # Examples
    ///
    /// ```
    /// use shelf_scrape::url::PageKind;
    ///
    /// let kind = PageKind::classify(
    ///     "https://www.shwapno.com/product/aci-pure-fortified-jeerashail-rice-5kg-14227",
    ///     "/product/",
    /// );
    /// assert_eq!(kind, PageKind::SingleProduct);
    /// assert_eq!(PageKind::classify("https://www.shwapno.com/eggs", "/product/"), PageKind::Listing);
    /// ```
    pub fn classify(url: &str, product_marker: &str) -> Self {
        if url.contains(product_marker) {
            Self::SingleProduct
        } else {
            Self::Listing
        }
    }

    /// Returns true if pages of this kind can link to further pages
    pub fn paginates(&self) -> bool {
        matches!(self, Self::Listing)
    }
}

/// One page within the current run. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageContext {
    pub url: String,
    /// 1-based position within the pagination walk
    pub index: u32,
    pub kind: PageKind,
}

/// Resolves an href to an absolute URL against `base_url`
///
/// Returns None if the link is not navigable:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel:, data: schemes
/// - anything that does not resolve to http(s)
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    match base_url.join(href) {
        Ok(absolute_url) => {
            if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
                Some(absolute_url)
            } else {
                None
            }
        }
        Err(_) => None,
    }
}
