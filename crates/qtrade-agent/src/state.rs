//! State discretization: maps continuous market features onto a small,
//! finite set of observable states the Q-table can index.
//!
//! Product domain: 9 (price change) * 5 (volume ratio) * 3 (trend) *
//! 3 (volatility) * 5 (position pct) = 2,025 states per symbol.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Trend {
    Down,
    Flat,
    Up,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Volatility {
    Low,
    Normal,
    High,
}

/// A discretized market state for one symbol, used as the Q-table key.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateKey {
    /// 9 bins, 0..=8, centered at bin 4 (no change).
    pub price_change_bin: u8,
    /// 5 bins, 0..=4.
    pub volume_ratio_bin: u8,
    pub trend: Trend,
    pub volatility: Volatility,
    /// 5 bins, 0..=4, bin 0 reserved for flat (zero position).
    pub position_bin: u8,
}

/// Raw, continuous feature inputs extracted from recent bars before
/// discretization.
#[derive(Clone, Debug)]
pub struct FeatureInputs {
    pub price_change_pct: f64,
    pub volume_ratio: f64,
    pub short_ma: f64,
    pub long_ma: f64,
    pub returns_stddev: f64,
    pub returns_stddev_baseline: f64,
    pub position_pct: f64,
}

/// 9-bin bucketing of a percent change, centered at zero with open-ended
/// outer bins. Bin width is `bin_width_pct` per step away from center.
fn bucket_signed(value: f64, bin_width_pct: f64, bins: u8) -> u8 {
    let half = (bins / 2) as f64;
    let scaled = (value / bin_width_pct).round();
    let clamped = scaled.clamp(-half, half);
    (clamped + half) as u8
}

fn bucket_unsigned(value: f64, step: f64, bins: u8) -> u8 {
    let scaled = (value / step).floor();
    let clamped = scaled.clamp(0.0, (bins - 1) as f64);
    clamped as u8
}

impl FeatureInputs {
    /// Discretize into a [`StateKey`]. `chase_threshold_pct` sets the bin
    /// width for the price-change axis (one bin per threshold-fraction of
    /// move, matching the scale patterns checks already reason about).
    pub fn discretize(&self, chase_threshold_pct: f64, max_position_pct: f64) -> StateKey {
        let bin_width = (chase_threshold_pct / 2.0).max(1e-6);
        let price_change_bin = bucket_signed(self.price_change_pct, bin_width, 9);
        let volume_ratio_bin = bucket_unsigned(self.volume_ratio, 0.4, 5);

        let trend = if self.short_ma > self.long_ma * 1.001 {
            Trend::Up
        } else if self.short_ma < self.long_ma * 0.999 {
            Trend::Down
        } else {
            Trend::Flat
        };

        let volatility = if self.returns_stddev_baseline <= 0.0 {
            Volatility::Normal
        } else {
            let ratio = self.returns_stddev / self.returns_stddev_baseline;
            if ratio < 0.7 {
                Volatility::Low
            } else if ratio > 1.3 {
                Volatility::High
            } else {
                Volatility::Normal
            }
        };

        let position_bin = if self.position_pct.abs() < 1e-9 {
            0
        } else {
            let step = max_position_pct.max(1e-6) / 4.0;
            1 + bucket_unsigned(self.position_pct.abs(), step, 4)
        };

        StateKey {
            price_change_bin,
            volume_ratio_bin,
            trend,
            volatility,
            position_bin,
        }
    }
}
