//! Scenario B: a fill large enough to flip a long position to short in one
//! shot (reversal), not merely reduce it.
//!
//! Open +50 @150, then SELL 120 @140 (commission 0). The 50 long units
//! close at a loss of 10/share; the remaining 70 units open a new short
//! position at the fill price.

use chrono::{TimeZone, Utc};
use qtrade_core::{Micros, UtcInstant};
use qtrade_portfolio::Portfolio;
use qtrade_types::{ExecutionReport, Side};

fn ts(ms: i64) -> UtcInstant {
    UtcInstant::from_utc(Utc.timestamp_millis_opt(ms).unwrap())
}

#[test]
fn reversal_realizes_pnl_on_closed_leg_and_opens_opposite_side() {
    let portfolio = Portfolio::new(Micros::from_units(100_000));

    let open = ExecutionReport {
        client_order_id: "open-1".to_string(),
        symbol: "AAPL".to_string(),
        side: Side::Buy,
        fill_price: Micros::from_units(150),
        filled_quantity: Micros::from_units(50),
        commission: Micros::ZERO,
        multiplier: 1,
        timestamp: ts(1_000),
    };
    portfolio.apply_fill(&open).unwrap();

    let reversal = ExecutionReport {
        client_order_id: "reverse-1".to_string(),
        symbol: "AAPL".to_string(),
        side: Side::Sell,
        fill_price: Micros::from_units(140),
        filled_quantity: Micros::from_units(120),
        commission: Micros::ZERO,
        multiplier: 1,
        timestamp: ts(2_000),
    };
    let realized = portfolio.apply_fill(&reversal).unwrap();

    assert_eq!(realized, Micros::from_units(-500));

    let pos = portfolio.position("AAPL").unwrap();
    assert_eq!(pos.quantity, Micros::from_units(-70));
    assert_eq!(pos.average_cost, Micros::from_units(140));
    assert!(pos.is_short());

    assert_eq!(portfolio.realized_pnl_cumulative(), Micros::from_units(-500));
    portfolio.verify_integrity().unwrap();
}
