//! Thread-safe multi-timeframe bar aggregator.

use std::collections::HashMap;
use std::sync::Mutex;

use qtrade_types::Bar;

use crate::buffer::TimeframeBuffer;
use crate::timeframe::Timeframe;

pub struct Aggregator {
    timeframes: Vec<Timeframe>,
    max_retention: usize,
    buffers: Mutex<HashMap<(String, Timeframe), TimeframeBuffer>>,
}

impl Aggregator {
    pub fn new(timeframes: Vec<Timeframe>, max_retention: usize) -> Self {
        Self {
            timeframes,
            max_retention,
            buffers: Mutex::new(HashMap::new()),
        }
    }

    /// Folds one base-interval bar into every configured higher timeframe
    /// for its symbol.
    pub fn ingest_base_bar(&self, bar: &Bar) {
        let mut buffers = self.buffers.lock().expect("aggregator mutex poisoned");
        for &timeframe in &self.timeframes {
            let key = (bar.symbol.clone(), timeframe);
            buffers
                .entry(key)
                .or_insert_with(|| TimeframeBuffer::new(timeframe, self.max_retention))
                .ingest(bar);
        }
    }

    /// Immutable copy of up to `lookback` of the most recent bars (closed
    /// bars plus the currently-forming one) for `symbol` at `timeframe`.
    pub fn get_bars(&self, symbol: &str, timeframe: Timeframe, lookback: usize) -> Vec<Bar> {
        let buffers = self.buffers.lock().expect("aggregator mutex poisoned");
        buffers
            .get(&(symbol.to_string(), timeframe))
            .map(|b| b.snapshot(lookback))
            .unwrap_or_default()
    }
}
