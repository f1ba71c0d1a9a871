//! Sink module: where a run's records end up
//!
//! This module handles:
//! - The [`RecordSink`] seam the binary writes through
//! - Service-account authorization for the Google APIs
//! - Appending rows (and a header, once) to a Google Sheets worksheet
//! - Printing records for dry runs

pub mod auth;
mod sheets;
mod stdout;
mod traits;

pub use auth::{ServiceAccountKey, TokenProvider};
pub use sheets::{GoogleSheetsSink, Worksheet};
pub use stdout::{render_table, StdoutSink};
pub use traits::{RecordSink, SinkError, SinkResult};

use crate::scrape::ProductRecord;

/// Hands a run's records to a sink exactly once
///
/// The sink is only opened for a non-empty batch, so a run that scraped
/// nothing reads no credentials and touches no spreadsheet.
///
/// # Arguments
///
/// * `records` - Everything the run collected
/// * `open_sink` - Builds the sink; not called for an empty batch
///
/// # Returns
///
/// * `Ok(usize)` - Number of records written (0 for an empty batch)
/// * `Err(SinkError)` - Opening the sink or writing to it failed
pub async fn deliver<F>(records: &[ProductRecord], open_sink: F) -> SinkResult<usize>
where
    F: FnOnce() -> SinkResult<Box<dyn RecordSink>>,
{
    if records.is_empty() {
        tracing::info!("No products were scraped. Exiting.");
        return Ok(0);
    }

    let sink = open_sink()?;
    sink.write_records(records).await
}
