//! Pipeline-level tunables that don't belong to any single crate below it:
//! which timeframes to read, how much history is "enough", and the moving
//! average / volatility windows used to build [`qtrade_agent::FeatureInputs`].

use qtrade_aggregator::Timeframe;
use qtrade_core::Micros;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub primary_timeframe: Timeframe,
    /// Higher timeframes consulted for cross-timeframe trend agreement.
    pub cross_timeframes: Vec<Timeframe>,
    /// Minimum closed bars required at `primary_timeframe` before the
    /// pipeline will consider a decision at all.
    pub min_bars_required: usize,
    pub short_ma_window: usize,
    pub long_ma_window: usize,
    pub volatility_window: usize,
    pub volatility_baseline_window: usize,
    /// Must match the agent's own `max_position_pct` — used only to scale
    /// the state discretizer's position-size bin width, not to size orders.
    pub max_position_pct: f64,
    /// Orders below this size are treated as a no-op rather than submitted.
    pub min_order_quantity: Micros,
    pub multiplier: i64,
    pub broker_min_notional: Micros,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            primary_timeframe: Timeframe::M5,
            cross_timeframes: vec![Timeframe::M15, Timeframe::H1],
            min_bars_required: 30,
            short_ma_window: 10,
            long_ma_window: 30,
            volatility_window: 10,
            volatility_baseline_window: 30,
            max_position_pct: 0.25,
            min_order_quantity: Micros::from_units(1),
            multiplier: 1,
            broker_min_notional: Micros::ZERO,
        }
    }
}
