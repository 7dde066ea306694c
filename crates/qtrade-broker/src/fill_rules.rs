//! Price-into-bar fill rules for the paper broker.

use qtrade_core::Micros;
use qtrade_types::{Bar, OrderKind, Side};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FillRulesConfig {
    pub slippage_bps: f64,
    pub partial_fill_probability: f64,
}

impl Default for FillRulesConfig {
    fn default() -> Self {
        Self {
            slippage_bps: 2.0,
            partial_fill_probability: 0.0,
        }
    }
}

/// Given a pending order and the bar it's being evaluated against, returns
/// `Some(fill_price)` if the order's trigger condition is met this bar, or
/// `None` if it should keep waiting.
pub fn evaluate_trigger(
    side: Side,
    kind: OrderKind,
    limit_price: Option<Micros>,
    stop_price: Option<Micros>,
    bar: &Bar,
    slippage_bps: f64,
) -> Option<Micros> {
    match kind {
        OrderKind::Market => Some(apply_slippage(bar.open, side, slippage_bps)),
        OrderKind::Limit => {
            let limit = limit_price?;
            let crossed = match side {
                Side::Buy => bar.low <= limit,
                Side::Sell => bar.high >= limit,
            };
            crossed.then_some(limit)
        }
        OrderKind::Stop => {
            let stop = stop_price?;
            let triggered = match side {
                Side::Buy => bar.high >= stop,
                Side::Sell => bar.low <= stop,
            };
            triggered.then_some(apply_slippage(stop, side, slippage_bps))
        }
    }
}

fn apply_slippage(price: Micros, side: Side, slippage_bps: f64) -> Micros {
    if slippage_bps == 0.0 {
        return price;
    }
    let adjustment = price.to_f64() * (slippage_bps / 10_000.0);
    let slipped = price.to_f64() + adjustment * side.sign() as f64;
    Micros::from_f64(slipped)
}

/// Splits `remaining` into a (possibly full) fill quantity, given the
/// configured partial-fill probability. A full fill is always at least 1
/// whole unit; never returns zero for a nonzero `remaining`.
pub fn partial_fill_quantity(remaining: Micros, probability: f64, rng: &mut impl Rng) -> Micros {
    if probability <= 0.0 || rng.gen::<f64>() >= probability {
        return remaining;
    }
    let fraction = rng.gen_range(0.3..0.9);
    let partial = Micros::from_f64(remaining.to_f64() * fraction);
    if partial.is_zero() {
        remaining
    } else {
        partial
    }
}
