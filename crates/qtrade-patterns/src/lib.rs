//! qtrade-patterns
//!
//! Pure severity-classifying functions over recent bars. Advisory input to
//! the Q-agent's confidence score — never a substitute for [`qtrade_risk`]'s
//! pre-trade checks.

mod checks;
mod severity;

pub use checks::{
    candlestick_signal, circuit_breaker, evaluate, extreme_move, low_liquidity, stale_data,
    PatternConfig,
};
pub use severity::Severity;

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use qtrade_core::{Micros, UtcInstant};
    use qtrade_types::Bar;

    fn ts(seconds: i64) -> UtcInstant {
        UtcInstant::from_utc(Utc.timestamp_opt(seconds, 0).unwrap())
    }

    fn bar(seconds: i64, open: i64, high: i64, low: i64, close: i64, vol: i64) -> Bar {
        Bar::new(
            "AAPL",
            ts(seconds),
            Micros::from_units(open),
            Micros::from_units(high),
            Micros::from_units(low),
            Micros::from_units(close),
            Micros::from_units(vol),
        )
        .unwrap()
    }

    #[test]
    fn stale_bar_blocks() {
        let bars = vec![bar(0, 100, 101, 99, 100, 1000)];
        let cfg = PatternConfig::default();
        let severity = evaluate(&bars, ts(cfg.stale_threshold_seconds + 1), &cfg);
        assert_eq!(severity, Severity::Blocked);
    }

    #[test]
    fn quiet_market_is_safe() {
        let bars = vec![
            bar(0, 100, 101, 99, 100, 1000),
            bar(60, 100, 101, 99, 100, 1000),
        ];
        let cfg = PatternConfig::default();
        let severity = evaluate(&bars, ts(120), &cfg);
        assert_eq!(severity, Severity::Safe);
    }

    #[test]
    fn large_single_bar_move_is_high_risk() {
        let bars = vec![
            bar(0, 100, 101, 99, 100, 1000),
            bar(60, 100, 120, 100, 120, 1000),
        ];
        let cfg = PatternConfig::default();
        let severity = evaluate(&bars, ts(120), &cfg);
        assert_eq!(severity, Severity::HighRisk);
    }

    #[test]
    fn thin_volume_is_caution() {
        let bars = vec![
            bar(0, 100, 101, 99, 100, 1000),
            bar(60, 100, 101, 99, 100, 1000),
            bar(120, 100, 101, 99, 100, 10),
        ];
        let severity = low_liquidity(&bars, 0.3);
        assert_eq!(severity, Severity::Caution);
    }
}
