//! CSV bar replay for paper-mode sessions.
//!
//! One row per bar: `symbol,timestamp,open,high,low,close,volume`, timestamp
//! as RFC3339. No live market-data feed is wired up, so replay from a file
//! on disk stands in for one during paper sessions.

use std::path::Path;

use anyhow::{Context, Result};
use qtrade_core::{Micros, UtcInstant};
use qtrade_types::Bar;

pub fn read_bars(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("open bar file {}", path.display()))?;

    let mut bars = Vec::new();
    for (row_index, record) in reader.records().enumerate() {
        let record = record.with_context(|| format!("read row {row_index} of {}", path.display()))?;
        if record.len() != 7 {
            anyhow::bail!(
                "row {row_index} of {}: expected 7 columns, got {}",
                path.display(),
                record.len()
            );
        }
        let symbol = record[0].to_string();
        let timestamp = UtcInstant::parse_rfc3339(&record[1])
            .with_context(|| format!("row {row_index}: invalid timestamp {:?}", &record[1]))?;
        let open = parse_price(&record[2], row_index)?;
        let high = parse_price(&record[3], row_index)?;
        let low = parse_price(&record[4], row_index)?;
        let close = parse_price(&record[5], row_index)?;
        let volume = parse_price(&record[6], row_index)?;

        let bar = Bar::new(symbol, timestamp, open, high, low, close, volume)
            .with_context(|| format!("row {row_index}: invalid bar"))?;
        bars.push(bar);
    }
    Ok(bars)
}

fn parse_price(field: &str, row_index: usize) -> Result<Micros> {
    let value: f64 = field
        .parse()
        .with_context(|| format!("row {row_index}: invalid numeric field {field:?}"))?;
    Ok(Micros::from_f64(value))
}
