//! Scenario E: cumulative daily losses breaching `max_daily_loss_pct` of
//! `daily_start_equity` transition the engine to a daily-loss halt.
//! Subsequent non-flattening orders are rejected; the next UTC day resets
//! and resumes trading.

use chrono::{TimeZone, Utc};
use qtrade_core::{Micros, UtcInstant};
use qtrade_risk::{HaltReason, PreTradeInput, RejectionReason, RiskConfig, RiskDecision, RiskEngine};

fn ts(y: i32, m: u32, d: u32, h: u32) -> UtcInstant {
    UtcInstant::from_utc(Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap())
}

fn opening_buy(equity: Micros, at: UtcInstant) -> PreTradeInput {
    PreTradeInput {
        symbol: "AAPL".to_string(),
        delta_quantity: Micros::from_units(10),
        price: Micros::from_units(100),
        timestamp: at,
        equity,
        current_position_quantity: Micros::ZERO,
        opens_new_symbol: true,
        active_position_count: 0,
        multiplier: 1,
        commission: Micros::ZERO,
    }
}

#[test]
fn daily_loss_halts_trading_until_the_next_utc_day() {
    let cfg = RiskConfig {
        max_daily_loss_pct: 0.02,
        min_balance_enabled: false,
        ..RiskConfig::default()
    };
    let engine = RiskEngine::new(cfg, Micros::from_units(100_000));
    engine.daily_reset(ts(2026, 7, 28, 9), Micros::from_units(100_000));

    // A loss-making fill brings cumulative daily realized PnL to -2,001,
    // past the 2% (2,000) threshold of the 100,000 starting equity.
    engine.register_trade(
        Micros::from_units(-2_001),
        Micros::ZERO,
        Micros::from_units(97_999),
    );

    assert!(engine.is_halted());
    assert_eq!(engine.halt_reason(), Some(HaltReason::DailyLoss));

    let decision = engine.pre_trade_check(&opening_buy(Micros::from_units(97_999), ts(2026, 7, 28, 10)));
    assert_eq!(decision, RiskDecision::Reject(RejectionReason::Halted));

    // A new UTC day rolls the daily P&L/start-equity and lifts the halt.
    engine.daily_reset(ts(2026, 7, 29, 0), Micros::from_units(97_999));
    assert!(!engine.is_halted());

    let decision = engine.pre_trade_check(&opening_buy(Micros::from_units(97_999), ts(2026, 7, 29, 1)));
    assert_eq!(decision, RiskDecision::Accept);
}
