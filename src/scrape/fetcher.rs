//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building an HTTP client with the browser user agent and timeout
//! - GET requests for listing and product pages
//! - Error classification (status, timeout, connection, body)
//!
//! Nothing here retries. A failed fetch is reported once and the caller
//! decides what to do with it.

use crate::config::ScrapeConfig;
use crate::{FetchError, FetchResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;
use std::time::Duration;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// The URL that was requested
    pub url: String,
    /// Final URL after redirects
    pub final_url: String,
    /// HTTP status code
    pub status_code: u16,
    /// Page body content
    pub body: String,
}

impl FetchedPage {
    /// Parses the body into a queryable document tree
    ///
    /// html5ever recovers from any malformed input, so this cannot fail.
    pub fn document(&self) -> Html {
        Html::parse_document(&self.body)
    }
}

/// Source of pages for the orchestrator
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetches one URL
    ///
    /// # Returns
    ///
    /// * `Ok(FetchedPage)` - 2xx response (after following redirects)
    /// * `Err(FetchError)` - network error, timeout, or 4xx/5xx status
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage>;
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The scrape configuration (user agent and timeout)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use shelf_scrape::config::ScrapeConfig;
/// use shelf_scrape::scrape::build_http_client;
///
/// let client = build_http_client(&ScrapeConfig::default()).unwrap();
/// ```
pub fn build_http_client(config: &ScrapeConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(config.request_timeout_secs))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Production fetcher backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(config: &ScrapeConfig) -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: build_http_client(config)?,
        })
    }

    /// Wraps an already configured client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> FetchResult<FetchedPage> {
        let result = fetch_url(&self.client, url).await;
        if let Err(e) = &result {
            tracing::warn!("Error fetching {}: {}", url, e);
        }
        result
    }
}

/// Fetches a URL and classifies any failure
///
/// # Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | 2xx (after redirects) | `Ok(FetchedPage)` |
/// | 4xx / 5xx | `FetchError::Status` |
/// | Timeout | `FetchError::Timeout` |
/// | Connection refused, DNS, TLS | `FetchError::Connect` |
/// | Anything else while sending | `FetchError::Network` |
/// | Body could not be read | `FetchError::Body` |
pub async fn fetch_url(client: &Client, url: &str) -> FetchResult<FetchedPage> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| classify_send_error(url, e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if status.is_client_error() || status.is_server_error() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout {
                url: url.to_string(),
            }
        } else {
            FetchError::Body {
                url: url.to_string(),
                message: e.to_string(),
            }
        }
    })?;

    Ok(FetchedPage {
        url: url.to_string(),
        final_url,
        status_code: status.as_u16(),
        body,
    })
}

fn classify_send_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Connect {
            url: url.to_string(),
            message: e.to_string(),
        }
    } else {
        FetchError::Network {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}
