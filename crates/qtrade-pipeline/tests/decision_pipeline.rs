//! End-to-end coverage of [`run_decision_pipeline`]'s gating checks plus the
//! submission contract (steps 6-9: fingerprint, idempotency, risk, broker).

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use chrono::{TimeZone, Utc};
use qtrade_aggregator::{Aggregator, Timeframe};
use qtrade_agent::{Action, AgentConfig, FsdAgent};
use qtrade_broker::{BrokerAdapter, BrokerResult};
use qtrade_core::{Micros, UtcInstant};
use qtrade_idempotency::IdempotencyTracker;
use qtrade_patterns::PatternConfig;
use qtrade_pipeline::{run_decision_pipeline, NoActionReason, PipelineConfig, PipelineOutcome, PositionContext};
use qtrade_risk::{HaltReason, RejectionReason, RiskConfig, RiskEngine};
use qtrade_types::{Bar, Order, OrderKind, Side};

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

fn ts(minute: i64) -> UtcInstant {
    UtcInstant::from_utc(Utc.timestamp_opt(minute * 60, 0).unwrap())
}

fn bar(symbol: &str, minute: i64, close: i64, volume: i64) -> Bar {
    Bar::new(
        symbol,
        ts(minute),
        Micros::from_units(close),
        Micros::from_units(close + 1),
        Micros::from_units(close - 1),
        Micros::from_units(close),
        Micros::from_units(volume),
    )
    .unwrap()
}

fn pipeline_cfg() -> PipelineConfig {
    PipelineConfig {
        primary_timeframe: Timeframe::M1,
        cross_timeframes: vec![],
        min_bars_required: 3,
        short_ma_window: 2,
        long_ma_window: 3,
        volatility_window: 2,
        volatility_baseline_window: 3,
        max_position_pct: 0.9,
        min_order_quantity: Micros::from_units(1),
        multiplier: 1,
        broker_min_notional: Micros::ZERO,
    }
}

fn agent_cfg() -> AgentConfig {
    AgentConfig {
        epsilon_start: 0.0,
        epsilon_min: 0.0,
        epsilon_decay_rate: 1.0,
        alpha: 0.5,
        gamma: 0.9,
        max_states: 100,
        q_decay_lambda: 0.0,
        base_size_fraction: 0.5,
        max_position_pct: 0.9,
        min_confidence_threshold: 0.0,
        risk_penalty: 0.0,
        transaction_cost: 0.0,
    }
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

/// Pre-seeds the agent's Q-table so that the state the pipeline will derive
/// from `history` deterministically selects `Buy` with `epsilon=0`, without
/// relying on exploration randomness in the test.
fn bias_toward_buy(agent: &FsdAgent, history: &[Bar], cfg: &PipelineConfig, equity: Micros) {
    let inputs = qtrade_pipeline::extract_features(history, Micros::ZERO, equity, cfg);
    let state = inputs.discretize(PatternConfig::default().chase_threshold_pct, cfg.max_position_pct);
    agent.learn(state, Action::Buy, Micros::from_units(100), Micros::ZERO, &state, &[Action::Hold]);
}

#[test]
fn insufficient_history_is_a_no_op_before_touching_risk_or_broker() {
    let cfg = pipeline_cfg();
    let aggregator = Aggregator::new(vec![cfg.primary_timeframe], 50);
    let agent = FsdAgent::new(agent_cfg());
    let risk = RiskEngine::new(permissive_risk_cfg(), Micros::from_units(1_000_000));
    let idempotency = IdempotencyTracker::new(30);
    let broker = CountingBroker::new();

    let only_bar = bar("AAPL", 0, 100, 1000);
    let outcome = run_decision_pipeline(
        "AAPL",
        &only_bar,
        ts(0),
        &aggregator,
        &PatternConfig::default(),
        &agent,
        &risk,
        &idempotency,
        &broker,
        &cfg,
        &PositionContext {
            current_position_quantity: Micros::ZERO,
            active_position_count: 0,
            equity: Micros::from_units(1_000_000),
            commission: Micros::ZERO,
        },
    );

    assert_eq!(outcome, PipelineOutcome::NoAction(NoActionReason::InsufficientHistory));
    assert_eq!(broker.call_count(), 0);
}

#[test]
fn stale_latest_bar_blocks_even_with_full_history() {
    let cfg = pipeline_cfg();
    let aggregator = Aggregator::new(vec![cfg.primary_timeframe], 50);
    for minute in 0..4 {
        aggregator.ingest_base_bar(&bar("AAPL", minute, 100 + minute, 1000));
    }
    let agent = FsdAgent::new(agent_cfg());
    let risk = RiskEngine::new(permissive_risk_cfg(), Micros::from_units(1_000_000));
    let idempotency = IdempotencyTracker::new(30);
    let broker = CountingBroker::new();

    let trigger = bar("AAPL", 4, 104, 1000);
    let pattern_cfg = PatternConfig::default();
    // Evaluate far past the stale threshold relative to the trigger bar.
    let far_future = ts(4 + pattern_cfg.stale_threshold_seconds / 60 + 10);

    let outcome = run_decision_pipeline(
        "AAPL",
        &trigger,
        far_future,
        &aggregator,
        &pattern_cfg,
        &agent,
        &risk,
        &idempotency,
        &broker,
        &cfg,
        &PositionContext {
            current_position_quantity: Micros::ZERO,
            active_position_count: 0,
            equity: Micros::from_units(1_000_000),
            commission: Micros::ZERO,
        },
    );

    assert_eq!(outcome, PipelineOutcome::NoAction(NoActionReason::Blocked));
    assert_eq!(broker.call_count(), 0);
}

#[test]
fn seeded_decision_submits_a_market_order_and_marks_idempotency() {
    let cfg = pipeline_cfg();
    let aggregator = Aggregator::new(vec![cfg.primary_timeframe], 50);
    let bars: Vec<Bar> = (0..5).map(|m| bar("AAPL", m, 100 + m, 1000)).collect();
    for b in &bars[..4] {
        aggregator.ingest_base_bar(b);
    }

    let agent = FsdAgent::new(agent_cfg());
    let equity = Micros::from_units(1_000_000);
    let history_for_state = &bars[2..5];
    bias_toward_buy(&agent, history_for_state, &cfg, equity);

    let risk = RiskEngine::new(permissive_risk_cfg(), equity);
    let idempotency = IdempotencyTracker::new(30);
    let broker = CountingBroker::new();

    let outcome = run_decision_pipeline(
        "AAPL",
        &bars[4],
        ts(4 + 1),
        &aggregator,
        &PatternConfig::default(),
        &agent,
        &risk,
        &idempotency,
        &broker,
        &cfg,
        &PositionContext {
            current_position_quantity: Micros::ZERO,
            active_position_count: 0,
            equity,
            commission: Micros::ZERO,
        },
    );

    let PipelineOutcome::Submitted { order, .. } = outcome else {
        panic!("expected Submitted, got {outcome:?}");
    };
    assert_eq!(order.side, Side::Buy);
    assert_eq!(order.kind, OrderKind::Market);
    assert_eq!(broker.call_count(), 1);
    assert!(idempotency.is_duplicate(&order.client_order_id, ts(4 + 1)));
}

#[test]
fn halted_risk_engine_rejects_before_reaching_the_broker() {
    let cfg = pipeline_cfg();
    let aggregator = Aggregator::new(vec![cfg.primary_timeframe], 50);
    let bars: Vec<Bar> = (0..5).map(|m| bar("AAPL", m, 100 + m, 1000)).collect();
    for b in &bars[..4] {
        aggregator.ingest_base_bar(b);
    }

    let agent = FsdAgent::new(agent_cfg());
    let equity = Micros::from_units(1_000_000);
    bias_toward_buy(&agent, &bars[2..5], &cfg, equity);

    let risk = RiskEngine::new(permissive_risk_cfg(), equity);
    risk.halt(HaltReason::Manual);
    let idempotency = IdempotencyTracker::new(30);
    let broker = CountingBroker::new();

    let outcome = run_decision_pipeline(
        "AAPL",
        &bars[4],
        ts(4 + 1),
        &aggregator,
        &PatternConfig::default(),
        &agent,
        &risk,
        &idempotency,
        &broker,
        &cfg,
        &PositionContext {
            current_position_quantity: Micros::ZERO,
            active_position_count: 0,
            equity,
            commission: Micros::ZERO,
        },
    );

    assert_eq!(outcome, PipelineOutcome::Rejected(RejectionReason::Halted));
    assert_eq!(broker.call_count(), 0);
}
