use serde::Deserialize;

/// Main configuration structure for Shelf-Scrape
///
/// Every section and key is optional in the TOML file; missing values fall
/// back to the defaults for the Shwapno storefront.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub scrape: ScrapeConfig,
    pub selectors: SelectorConfig,
    pub sheet: SheetConfig,
}

/// Run and HTTP behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrapeConfig {
    /// First page to fetch (listing or single product)
    #[serde(rename = "start-url")]
    pub start_url: String,

    /// Origin that pagination links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Maximum number of listing pages to fetch in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Pause between successive page fetches (milliseconds)
    #[serde(rename = "page-delay-ms")]
    pub page_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,

    /// User-Agent header sent with every request
    #[serde(rename = "user-agent")]
    pub user_agent: String,

    /// URL substring that marks a single-product page
    #[serde(rename = "product-url-marker")]
    pub product_url_marker: String,

    /// Value written for fields that could not be located
    pub placeholder: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.shwapno.com/eggs".to_string(),
            base_url: "https://www.shwapno.com".to_string(),
            max_pages: 1,
            page_delay_ms: 2000,
            request_timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            product_url_marker: "/product/".to_string(),
            placeholder: "N/A".to_string(),
        }
    }
}

/// Desktop browser string the storefront expects
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Field-to-selector mapping for every page type
///
/// These track the storefront's current markup and are expected to drift.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub product: ProductSelectors,
    pub listing: ListingSelectors,
    pub pagination: PaginationSelectors,
}

/// Selectors for a single-product detail page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ProductSelectors {
    pub name: String,
    pub price: String,
    pub amount: String,
}

impl Default for ProductSelectors {
    fn default() -> Self {
        Self {
            name: "h1#product-name".to_string(),
            price: "ins.inline-block".to_string(),
            amount: "span.whitespace-nowrap".to_string(),
        }
    }
}

/// Selectors for a category listing page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListingSelectors {
    /// Element wrapping one product card
    pub container: String,

    /// Tried once when `container` matches nothing
    #[serde(rename = "fallback-container")]
    pub fallback_container: String,

    pub name: String,
    pub price: String,
    pub amount: String,
}

impl Default for ListingSelectors {
    fn default() -> Self {
        Self {
            container: "div.product-item-container".to_string(),
            fallback_container: "div.col-6".to_string(),
            name: "a.product-name".to_string(),
            price: "span.product-price".to_string(),
            amount: "span.product-amount".to_string(),
        }
    }
}

/// Selectors for locating the next listing page
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PaginationSelectors {
    /// Numbered page links; the one whose text is `index + 1` wins
    #[serde(rename = "page-link")]
    pub page_link: String,

    /// Also accept an `<a rel="next">` link when no numbered link matches
    #[serde(rename = "rel-next-fallback")]
    pub rel_next_fallback: bool,
}

impl Default for PaginationSelectors {
    fn default() -> Self {
        Self {
            page_link: "a.page-link".to_string(),
            rel_next_fallback: false,
        }
    }
}

/// Spreadsheet destination
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SheetConfig {
    /// Spreadsheet document name, looked up by name
    pub spreadsheet: String,

    /// Tab inside the spreadsheet
    pub worksheet: String,

    /// Environment variable holding the service-account JSON key
    #[serde(rename = "credential-env")]
    pub credential_env: String,

    #[serde(rename = "sheets-api-base")]
    pub sheets_api_base: String,

    #[serde(rename = "drive-api-base")]
    pub drive_api_base: String,

    /// Per-request timeout for the token, Drive and Sheets calls (seconds)
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for SheetConfig {
    fn default() -> Self {
        Self {
            spreadsheet: "Shwapno Grocery Data".to_string(),
            worksheet: "Products".to_string(),
            credential_env: "GSPREAD_SERVICE_ACCOUNT_KEY".to_string(),
            sheets_api_base: "https://sheets.googleapis.com/v4".to_string(),
            drive_api_base: "https://www.googleapis.com/drive/v3".to_string(),
            request_timeout_secs: 30,
        }
    }
}
