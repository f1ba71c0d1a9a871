//! Table printer used by `--dry-run`

use crate::scrape::{ProductRecord, HEADER};
use crate::sink::traits::{RecordSink, SinkResult};
use async_trait::async_trait;
use std::io::Write;

/// Prints records to standard output instead of persisting them
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

#[async_trait]
impl RecordSink for StdoutSink {
    async fn write_records(&self, records: &[ProductRecord]) -> SinkResult<usize> {
        let table = render_table(records);
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(table.as_bytes())?;
        stdout.flush()?;
        Ok(records.len())
    }
}

/// Renders the header and rows as a column-aligned text table
pub fn render_table(records: &[ProductRecord]) -> String {
    let rows: Vec<[String; 3]> = std::iter::once(HEADER.map(String::from))
        .chain(records.iter().map(ProductRecord::to_row))
        .collect();

    let mut widths = [0usize; 3];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let line = row
            .iter()
            .zip(widths)
            .map(|(cell, width)| {
                let pad = width - cell.chars().count();
                format!("{}{}", cell, " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" | ");
        out.push_str(line.trim_end());
        out.push('\n');

        if i == 0 {
            let rule = widths
                .iter()
                .map(|w| "-".repeat(*w))
                .collect::<Vec<_>>()
                .join("-+-");
            out.push_str(&rule);
            out.push('\n');
        }
    }
    out
}
