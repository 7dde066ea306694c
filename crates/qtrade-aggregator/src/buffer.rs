//! Per-symbol, per-timeframe rolling bar buffer.

use std::collections::VecDeque;

use qtrade_core::{Micros, UtcInstant};
use qtrade_types::Bar;

use crate::timeframe::Timeframe;

pub struct TimeframeBuffer {
    timeframe: Timeframe,
    max_retention: usize,
    open_bucket_start: Option<i64>,
    open_bar: Option<OpenBar>,
    closed: VecDeque<Bar>,
}

struct OpenBar {
    symbol: String,
    open: Micros,
    high: Micros,
    low: Micros,
    close: Micros,
    volume: Micros,
    bucket_start: UtcInstant,
}

impl TimeframeBuffer {
    pub fn new(timeframe: Timeframe, max_retention: usize) -> Self {
        Self {
            timeframe,
            max_retention,
            open_bucket_start: None,
            open_bar: None,
            closed: VecDeque::new(),
        }
    }

    /// Folds one base-interval bar into this timeframe. Closes and retains
    /// the previous bucket's bar when `base_bar` starts a new bucket.
    pub fn ingest(&mut self, base_bar: &Bar) {
        let bucket_start = self
            .timeframe
            .bucket_start(base_bar.timestamp.as_utc().timestamp());

        match self.open_bucket_start {
            Some(current) if current == bucket_start => {
                let open_bar = self.open_bar.as_mut().expect("bucket start set implies open bar");
                open_bar.high = open_bar.high.max(base_bar.high);
                open_bar.low = open_bar.low.min(base_bar.low);
                open_bar.close = base_bar.close;
                open_bar.volume = open_bar.volume.saturating_add(base_bar.volume);
            }
            _ => {
                self.close_open_bar();
                self.open_bucket_start = Some(bucket_start);
                self.open_bar = Some(OpenBar {
                    symbol: base_bar.symbol.clone(),
                    open: base_bar.open,
                    high: base_bar.high,
                    low: base_bar.low,
                    close: base_bar.close,
                    volume: base_bar.volume,
                    bucket_start: base_bar.timestamp,
                });
            }
        }
    }

    fn close_open_bar(&mut self) {
        if let Some(open_bar) = self.open_bar.take() {
            if let Ok(bar) = Bar::new(
                open_bar.symbol,
                open_bar.bucket_start,
                open_bar.open,
                open_bar.high,
                open_bar.low,
                open_bar.close,
                open_bar.volume,
            ) {
                self.closed.push_back(bar);
                while self.closed.len() > self.max_retention {
                    self.closed.pop_front();
                }
            }
        }
    }

    /// Closed bars plus the currently-open (still-forming) bar, most recent
    /// `lookback` entries.
    pub fn snapshot(&self, lookback: usize) -> Vec<Bar> {
        let mut bars: Vec<Bar> = self.closed.iter().cloned().collect();
        if let Some(open_bar) = &self.open_bar {
            if let Ok(bar) = Bar::new(
                open_bar.symbol.clone(),
                open_bar.bucket_start,
                open_bar.open,
                open_bar.high,
                open_bar.low,
                open_bar.close,
                open_bar.volume,
            ) {
                bars.push(bar);
            }
        }
        let start = bars.len().saturating_sub(lookback);
        bars[start..].to_vec()
    }
}
