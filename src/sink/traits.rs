//! Sink trait and error types
//!
//! A sink receives the whole batch of records once, at the end of a run.

use crate::scrape::ProductRecord;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while persisting records
///
/// All of these end the run. Nothing is retried.
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Credential environment variable {0} is not set")]
    MissingCredential(String),

    #[error("Invalid service account key: {0}")]
    InvalidCredential(String),

    #[error("Authorization failed: {0}")]
    Auth(String),

    #[error("Spreadsheet '{0}' not found or not shared with the service account")]
    SpreadsheetNotFound(String),

    #[error("Worksheet '{0}' not found")]
    WorksheetNotFound(String),

    #[error("{operation} failed with HTTP {status}: {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Destination for a run's records
#[async_trait]
pub trait RecordSink: Send + Sync {
    /// Persists the batch
    ///
    /// # Arguments
    ///
    /// * `records` - Every record of the run, in scrape order
    ///
    /// # Returns
    ///
    /// * `Ok(usize)` - Number of records written
    /// * `Err(SinkError)` - Authentication or write failure
    async fn write_records(&self, records: &[ProductRecord]) -> SinkResult<usize>;
}
