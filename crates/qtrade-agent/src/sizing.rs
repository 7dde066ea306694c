//! Position sizing: converts a confidence score and severity scale into a
//! concrete share quantity.

use qtrade_core::Micros;

#[derive(Clone, Debug)]
pub struct SizingInputs {
    pub equity: Micros,
    pub base_size_fraction: f64,
    pub confidence: f64,
    pub severity_scale: f64,
    pub max_position_pct: f64,
    pub broker_min_notional: Micros,
    pub price: Micros,
    pub multiplier: i64,
}

/// Target notional = `equity * base_size_fraction * confidence *
/// severity_scale`, capped by `max_position_pct * equity`, floored at the
/// broker's minimum order notional, then converted to a whole-share
/// quantity at `price` via `multiplier`. Float math is a sizing-boundary
/// exception (like pattern severity and confidence scoring); the resulting
/// share count is rounded down to an integer and converted back to
/// [`Micros`] before re-entering ledger/order arithmetic.
pub fn target_quantity(inputs: &SizingInputs) -> Micros {
    if inputs.price.raw() <= 0 || inputs.multiplier <= 0 {
        return Micros::ZERO;
    }

    let equity_f = inputs.equity.to_f64();
    let mut target_notional =
        equity_f * inputs.base_size_fraction * inputs.confidence * inputs.severity_scale;
    target_notional = target_notional.max(0.0);

    let cap = equity_f * inputs.max_position_pct;
    target_notional = target_notional.min(cap);

    let min_notional = inputs.broker_min_notional.to_f64();
    if target_notional < min_notional {
        target_notional = min_notional;
    }

    let per_share_notional = inputs.price.to_f64() * inputs.multiplier as f64;
    if per_share_notional <= 0.0 {
        return Micros::ZERO;
    }

    let whole_shares = (target_notional / per_share_notional).floor();
    if whole_shares < 1.0 {
        return Micros::ZERO;
    }

    Micros::from_f64(whole_shares)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sizes_within_max_position_cap() {
        let inputs = SizingInputs {
            equity: Micros::from_units(100_000),
            base_size_fraction: 1.0,
            confidence: 1.0,
            severity_scale: 1.0,
            max_position_pct: 0.1,
            broker_min_notional: Micros::ZERO,
            price: Micros::from_units(100),
            multiplier: 1,
        };
        // Uncapped target would be 100,000; capped to 10,000 -> 100 shares.
        assert_eq!(target_quantity(&inputs), Micros::from_units(100));
    }

    #[test]
    fn below_minimum_share_rounds_down_to_zero_no_trade() {
        let inputs = SizingInputs {
            equity: Micros::from_units(1_000),
            base_size_fraction: 0.001,
            confidence: 1.0,
            severity_scale: 1.0,
            max_position_pct: 1.0,
            broker_min_notional: Micros::ZERO,
            price: Micros::from_units(500),
            multiplier: 1,
        };
        assert_eq!(target_quantity(&inputs), Micros::ZERO);
    }
}
