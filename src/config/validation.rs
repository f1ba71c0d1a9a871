use crate::config::types::{Config, ScrapeConfig, SelectorConfig, SheetConfig};
use crate::ConfigError;
use scraper::Selector;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_scrape_config(&config.scrape)?;
    validate_selectors(&config.selectors)?;
    validate_sheet_config(&config.sheet)?;
    Ok(())
}

/// Validates run and HTTP settings
fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    validate_http_url("start-url", &config.start_url)?;
    validate_http_url("base-url", &config.base_url)?;

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max-pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.request_timeout_secs < 1 || config.request_timeout_secs > 120 {
        return Err(ConfigError::Validation(format!(
            "request-timeout-secs must be between 1 and 120, got {}",
            config.request_timeout_secs
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent cannot be empty".to_string(),
        ));
    }

    if config.product_url_marker.is_empty() {
        return Err(ConfigError::Validation(
            "product-url-marker cannot be empty".to_string(),
        ));
    }

    if config.placeholder.trim().is_empty() {
        return Err(ConfigError::Validation(
            "placeholder cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that every configured selector compiles
fn validate_selectors(config: &SelectorConfig) -> Result<(), ConfigError> {
    let fields = [
        ("product.name", &config.product.name),
        ("product.price", &config.product.price),
        ("product.amount", &config.product.amount),
        ("listing.container", &config.listing.container),
        ("listing.fallback-container", &config.listing.fallback_container),
        ("listing.name", &config.listing.name),
        ("listing.price", &config.listing.price),
        ("listing.amount", &config.listing.amount),
        ("pagination.page-link", &config.pagination.page_link),
    ];

    for (field, selector) in fields {
        compile_selector(field, selector)?;
    }

    Ok(())
}

/// Validates the spreadsheet destination
fn validate_sheet_config(config: &SheetConfig) -> Result<(), ConfigError> {
    if config.spreadsheet.trim().is_empty() {
        return Err(ConfigError::Validation(
            "spreadsheet cannot be empty".to_string(),
        ));
    }

    if config.worksheet.trim().is_empty() {
        return Err(ConfigError::Validation(
            "worksheet cannot be empty".to_string(),
        ));
    }

    if config.credential_env.is_empty() {
        return Err(ConfigError::Validation(
            "credential-env cannot be empty".to_string(),
        ));
    }

    validate_http_url("sheets-api-base", &config.sheets_api_base)?;
    validate_http_url("drive-api-base", &config.drive_api_base)?;

    if config.request_timeout_secs == 0 || config.request_timeout_secs > 300 {
        return Err(ConfigError::Validation(
            "sheet request-timeout-secs must be between 1 and 300".to_string(),
        ));
    }

    Ok(())
}

/// Compiles a CSS selector, naming the config field on failure
pub(crate) fn compile_selector(field: &str, selector: &str) -> Result<Selector, ConfigError> {
    if selector.trim().is_empty() {
        return Err(ConfigError::InvalidSelector {
            field: field.to_string(),
            selector: selector.to_string(),
        });
    }

    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        field: field.to_string(),
        selector: selector.to_string(),
    })
}

fn validate_http_url(field: &str, value: &str) -> Result<(), ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, value, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' must use http or https",
            field, value
        )));
    }

    Ok(())
}
