//! Shelf-Scrape: a grocery listing scraper
//!
//! This crate walks a retailer's product listing pages, extracts
//! name/price/unit triples from the HTML, and appends them as rows to a
//! spreadsheet. One invocation is one batch run.

pub mod config;
pub mod scrape;
pub mod sink;
pub mod url;

use thiserror::Error;

/// Errors that keep a scrape run from starting
///
/// Once a run is under way nothing is fatal; page failures end up in
/// [`ScrapeOutcome::stop_reason`] instead.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid selector for {field}: '{selector}'")]
    InvalidSelector { field: String, selector: String },
}

/// Page fetch failures
///
/// None of these are fatal to a run; the orchestrator stops advancing and
/// keeps what it already has.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {message}")]
    Connect { url: String, message: String },

    #[error("Network error for {url}: {message}")]
    Network { url: String, message: String },

    #[error("Failed to read body of {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    /// The URL the failed request was addressed to
    pub fn url(&self) -> &str {
        match self {
            Self::Status { url, .. }
            | Self::Timeout { url }
            | Self::Connect { url, .. }
            | Self::Network { url, .. }
            | Self::Body { url, .. } => url,
        }
    }
}

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for page fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use scrape::{ProductRecord, ScrapeOrchestrator, ScrapeOutcome, StopReason};
pub use sink::{RecordSink, SinkError};
pub use crate::url::{PageContext, PageKind};
