//! Scenario C: submit order X, broker accepts it, then a network glitch
//! causes the coordinator to retry the identical order within the
//! idempotency TTL. The retry must never reach the broker and
//! `risk.record_order_submission` must be called exactly once.
//!
//! This exercises the pipeline's steps 7-9 directly with a hand-built
//! `Order` rather than via two `run_decision_pipeline` calls: replaying the
//! same bar through step 1 would double-count its volume in the aggregator,
//! which is not what a submission retry means in practice (only the
//! already-decided order is retried, not the market data that produced it).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use qtrade_broker::{BrokerAdapter, BrokerResult};
use qtrade_core::{Micros, UtcInstant};
use qtrade_idempotency::IdempotencyTracker;
use qtrade_risk::{PreTradeInput, RiskConfig, RiskDecision, RiskEngine, RejectionReason};
use qtrade_types::{Order, OrderKind, Side};

struct CountingBroker {
    calls: AtomicUsize,
}

impl CountingBroker {
    fn new() -> Self {
        Self { calls: AtomicUsize::new(0) }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl BrokerAdapter for CountingBroker {
    fn start(&self) -> BrokerResult<()> {
        Ok(())
    }
    fn stop(&self) -> BrokerResult<()> {
        Ok(())
    }
    fn submit(&self, _order: &Order) -> BrokerResult<String> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("sim-{n}"))
    }
    fn cancel(&self, _order_id: &str) -> BrokerResult<()> {
        Ok(())
    }
    fn cancel_all_orders(&self) -> BrokerResult<()> {
        Ok(())
    }
    fn reconcile_positions(&self, _timeout: Duration) -> BrokerResult<BTreeMap<String, Micros>> {
        Ok(BTreeMap::new())
    }
}

fn ts(seconds: i64) -> UtcInstant {
    UtcInstant::from_utc(Utc.timestamp_opt(seconds, 0).unwrap())
}

fn permissive_risk_cfg() -> RiskConfig {
    RiskConfig {
        max_position_pct: 0.9,
        max_concurrent_positions: 10,
        window_seconds: 60,
        max_orders_per_window: 2,
        min_balance_enabled: false,
        minimum_balance: Micros::ZERO,
        max_daily_loss_pct: 0.9,
        max_drawdown_pct: 0.9,
    }
}

#[test]
fn resubmitting_an_identical_order_is_idempotent_and_preserves_rate_limit_budget() {
    let now = ts(0);
    let risk = RiskEngine::new(permissive_risk_cfg(), Micros::from_units(1_000_000));
    let idempotency = IdempotencyTracker::new(30);
    let broker = CountingBroker::new();

    let order = Order::new("AAPL", Side::Buy, Micros::from_units(10), OrderKind::Market, None, None, 1, now)
        .unwrap();

    let pre_trade = PreTradeInput {
        symbol: "AAPL".to_string(),
        delta_quantity: order.quantity,
        price: Micros::from_units(100),
        timestamp: now,
        equity: Micros::from_units(1_000_000),
        current_position_quantity: Micros::ZERO,
        opens_new_symbol: true,
        active_position_count: 0,
        multiplier: 1,
        commission: Micros::ZERO,
    };

    // First attempt: not a duplicate, risk accepts, broker submits.
    assert!(!idempotency.is_duplicate(&order.client_order_id, now));
    assert_eq!(risk.pre_trade_check(&pre_trade), RiskDecision::Accept);
    broker.submit(&order).unwrap();
    idempotency.mark_submitted(&order.client_order_id, now).unwrap();
    risk.record_order_submission(now);

    // Retry within the TTL: caught by the duplicate check before either the
    // broker or the risk engine's submission accounting are touched again.
    assert!(idempotency.is_duplicate(&order.client_order_id, now));
    assert_eq!(broker.call_count(), 1);

    // A second, distinct order still has exactly one slot of budget left —
    // if the retry above had double-counted, this would now be rejected.
    let other_order =
        Order::new("MSFT", Side::Buy, Micros::from_units(5), OrderKind::Market, None, None, 1, now).unwrap();
    let other_pre_trade = PreTradeInput {
        symbol: "MSFT".to_string(),
        ..pre_trade
    };
    assert_eq!(risk.pre_trade_check(&other_pre_trade), RiskDecision::Accept);
    broker.submit(&other_order).unwrap();
    risk.record_order_submission(now);
    assert_eq!(broker.call_count(), 2);

    // Budget is now exhausted: a third distinct order is rate-limited.
    let third_pre_trade = PreTradeInput {
        symbol: "GOOG".to_string(),
        ..other_pre_trade
    };
    assert_eq!(
        risk.pre_trade_check(&third_pre_trade),
        RiskDecision::Reject(RejectionReason::RateLimit)
    );
}
