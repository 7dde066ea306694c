//! Pure severity-classifying functions over recent bars.

use qtrade_core::UtcInstant;
use qtrade_types::Bar;
use serde::{Deserialize, Serialize};

use crate::severity::Severity;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PatternConfig {
    pub stale_threshold_seconds: i64,
    pub chase_threshold_pct: f64,
    pub low_liquidity_ratio: f64,
    pub circuit_breaker_consecutive_moves: usize,
    pub circuit_breaker_move_pct: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            stale_threshold_seconds: 300,
            chase_threshold_pct: 0.05,
            low_liquidity_ratio: 0.3,
            circuit_breaker_consecutive_moves: 3,
            circuit_breaker_move_pct: 0.02,
        }
    }
}

/// Bars are expected in ascending timestamp order, most recent last.
pub fn evaluate(bars: &[Bar], now: UtcInstant, cfg: &PatternConfig) -> Severity {
    let Some(latest) = bars.last() else {
        return Severity::Blocked;
    };

    if zero_or_negative_price(latest) {
        return Severity::Blocked;
    }

    let mut worst = stale_data(latest, now, cfg.stale_threshold_seconds);
    worst = worst.worst(extreme_move(latest, cfg.chase_threshold_pct));
    worst = worst.worst(low_liquidity(bars, cfg.low_liquidity_ratio));
    worst = worst.worst(circuit_breaker(
        bars,
        cfg.circuit_breaker_consecutive_moves,
        cfg.circuit_breaker_move_pct,
    ));
    worst = worst.worst(candlestick_signal(bars));
    worst
}

fn zero_or_negative_price(bar: &Bar) -> bool {
    bar.close.is_zero() || bar.close.is_negative()
}

/// `Blocked` if the most recent bar is older than `stale_threshold_seconds`
/// relative to `now`.
pub fn stale_data(latest: &Bar, now: UtcInstant, stale_threshold_seconds: i64) -> Severity {
    let age = now.duration_since(latest.timestamp).num_seconds();
    if age >= stale_threshold_seconds {
        Severity::Blocked
    } else {
        Severity::Safe
    }
}

/// `HighRisk` if the latest bar's single-bar move exceeds `chase_threshold_pct`.
pub fn extreme_move(latest: &Bar, chase_threshold_pct: f64) -> Severity {
    if latest.change_pct().abs() > chase_threshold_pct {
        Severity::HighRisk
    } else {
        Severity::Safe
    }
}

/// `Caution` if the latest bar's volume is below `ratio` of the trailing
/// mean volume (excluding the latest bar itself).
pub fn low_liquidity(bars: &[Bar], ratio: f64) -> Severity {
    if bars.len() < 2 {
        return Severity::Safe;
    }
    let (history, latest) = bars.split_at(bars.len() - 1);
    let latest = &latest[0];
    let mean_volume: f64 =
        history.iter().map(|b| b.volume.to_f64()).sum::<f64>() / history.len() as f64;
    if mean_volume <= 0.0 {
        return Severity::Safe;
    }
    if latest.volume.to_f64() < mean_volume * ratio {
        Severity::Caution
    } else {
        Severity::Safe
    }
}

/// `HighRisk` if the trailing `consecutive_moves` bars each moved beyond
/// `move_pct` in the same direction — a circuit-breaker-style cascade.
pub fn circuit_breaker(bars: &[Bar], consecutive_moves: usize, move_pct: f64) -> Severity {
    if consecutive_moves == 0 || bars.len() < consecutive_moves {
        return Severity::Safe;
    }
    let tail = &bars[bars.len() - consecutive_moves..];
    let all_down = tail.iter().all(|b| b.change_pct() <= -move_pct);
    let all_up = tail.iter().all(|b| b.change_pct() >= move_pct);
    if all_down || all_up {
        Severity::HighRisk
    } else {
        Severity::Safe
    }
}

/// `Caution` on a doji (open ≈ close relative to the bar's range) in the
/// most recent bar — a classic indecision signal. A minimal, defensible
/// candlestick check rather than a full pattern library.
pub fn candlestick_signal(bars: &[Bar]) -> Severity {
    let Some(latest) = bars.last() else {
        return Severity::Safe;
    };
    let range = (latest.high - latest.low).to_f64();
    if range <= 0.0 {
        return Severity::Safe;
    }
    let body = (latest.close - latest.open).to_f64().abs();
    if body / range < 0.1 {
        Severity::Caution
    } else {
        Severity::Safe
    }
}
