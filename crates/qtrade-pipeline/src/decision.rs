//! The nine-step per-symbol decision pipeline: bar ingest through order
//! submission.

use qtrade_agent::{Action, FsdAgent};
use qtrade_aggregator::Aggregator;
use qtrade_broker::BrokerAdapter;
use qtrade_core::{Micros, UtcInstant};
use qtrade_idempotency::IdempotencyTracker;
use qtrade_patterns::PatternConfig;
use qtrade_risk::{PreTradeInput, RiskDecision, RiskEngine};
use qtrade_types::{Bar, Order, OrderKind, Side};

use crate::config::PipelineConfig;
use crate::features;
use crate::outcome::{NoActionReason, PipelineOutcome};

/// Everything the pipeline needs to know about the current book for
/// `symbol` that it cannot derive from the bar stream alone.
pub struct PositionContext {
    pub current_position_quantity: Micros,
    pub active_position_count: usize,
    pub equity: Micros,
    pub commission: Micros,
}

/// Runs the full decision pipeline for one symbol on the arrival of one new
/// base-interval `bar`. Steps are numbered in comments to match the
/// per-symbol decision sequence: aggregate, gate on history and edge
/// conditions, decide, size, dedupe, risk-check, submit.
#[allow(clippy::too_many_arguments)]
pub fn run_decision_pipeline(
    symbol: &str,
    bar: &Bar,
    now: UtcInstant,
    aggregator: &Aggregator,
    pattern_cfg: &PatternConfig,
    agent: &FsdAgent,
    risk: &RiskEngine,
    idempotency: &IdempotencyTracker,
    broker: &dyn BrokerAdapter,
    cfg: &PipelineConfig,
    position: &PositionContext,
) -> PipelineOutcome {
    // 1. Update aggregator / refresh last price.
    aggregator.ingest_base_bar(bar);
    let history_len = cfg.long_ma_window.max(cfg.min_bars_required);
    let bars = aggregator.get_bars(symbol, cfg.primary_timeframe, history_len);

    // 2. Insufficient-history check.
    if bars.len() < cfg.min_bars_required {
        return PipelineOutcome::NoAction(NoActionReason::InsufficientHistory);
    }

    // 3. Pattern / edge check — `Blocked` suppresses any action outright.
    let severity = qtrade_patterns::evaluate(&bars, now, pattern_cfg);
    if severity.is_blocked() {
        return PipelineOutcome::NoAction(NoActionReason::Blocked);
    }

    // 4. Extract state, compute action/confidence/target quantity.
    let price = bar.close;
    let current_position_quantity = position.current_position_quantity;
    let position_notional_abs = current_position_quantity.abs().mul_amount(price);
    let inputs = features::extract(&bars, position_notional_abs, position.equity, cfg);
    let primary_sign = features::primary_trend_sign(&bars, cfg);
    let cross_agreement = features::cross_timeframe_agreement(aggregator, symbol, primary_sign, cfg);
    let pattern_signal_agrees = !matches!(severity, qtrade_patterns::Severity::Caution);

    let state = inputs.discretize(pattern_cfg.chase_threshold_pct, cfg.max_position_pct);
    let decision = agent.decide(
        &state,
        current_position_quantity,
        severity,
        pattern_signal_agrees,
        cross_agreement,
        position.equity,
        price,
        cfg.multiplier,
        cfg.broker_min_notional,
    );

    if matches!(decision.action, Action::Hold) || decision.target_quantity.is_zero() {
        return PipelineOutcome::NoAction(NoActionReason::LowConfidence);
    }

    // 5. Delta-quantity / minimum check.
    let delta = signed_delta(decision.action, current_position_quantity, decision.target_quantity);
    if delta.is_zero() || delta.abs() < cfg.min_order_quantity {
        return PipelineOutcome::NoAction(NoActionReason::BelowMinimumQuantity);
    }

    let side = if delta.is_negative() { Side::Sell } else { Side::Buy };
    let quantity = delta.abs();

    // 6. Deterministic client_order_id, computed inside `Order::new`.
    let order = match Order::new(symbol, side, quantity, OrderKind::Market, None, None, cfg.multiplier, now) {
        Ok(order) => order,
        Err(err) => {
            tracing::error!(symbol, %err, "pipeline built an invalid order, dropping");
            return PipelineOutcome::NoAction(NoActionReason::BelowMinimumQuantity);
        }
    };

    // 7. Idempotency check — a duplicate aborts before touching risk state.
    if idempotency.is_duplicate(&order.client_order_id, now) {
        return PipelineOutcome::Duplicate;
    }

    // 8. Risk pre-trade check.
    let pre_trade = PreTradeInput {
        symbol: symbol.to_string(),
        delta_quantity: delta,
        price,
        timestamp: now,
        equity: position.equity,
        current_position_quantity,
        opens_new_symbol: current_position_quantity.is_zero(),
        active_position_count: position.active_position_count,
        multiplier: cfg.multiplier,
        commission: position.commission,
    };
    if let RiskDecision::Reject(reason) = risk.pre_trade_check(&pre_trade) {
        return PipelineOutcome::Rejected(reason);
    }

    // 9. Submit; mark idempotent and record the submission only once the
    // broker has actually accepted the order.
    match broker.submit(&order) {
        Ok(order_id) => {
            if let Err(err) = idempotency.mark_submitted(&order.client_order_id, now) {
                tracing::error!(%err, "failed to persist idempotency record after submission");
            }
            risk.record_order_submission(now);
            PipelineOutcome::Submitted {
                order_id,
                order,
                state,
                action: decision.action,
            }
        }
        Err(err) => {
            tracing::error!(symbol, %err, "broker rejected order submission");
            PipelineOutcome::SubmissionFailed(err.to_string())
        }
    }
}

/// Maps an agent [`Action`] onto a signed quantity delta relative to the
/// current position. `Buy`/`Sell` open a flat position outright; `Increase`
/// adds to the existing direction; `Decrease` trims toward, never through,
/// flat.
fn signed_delta(action: Action, current: Micros, target_quantity: Micros) -> Micros {
    match action {
        Action::Hold => Micros::ZERO,
        Action::Buy => target_quantity,
        Action::Sell => -target_quantity,
        Action::Increase => {
            if current.is_negative() {
                -target_quantity
            } else {
                target_quantity
            }
        }
        Action::Decrease => {
            let trim = target_quantity.min(current.abs());
            if current.is_negative() {
                trim
            } else {
                -trim
            }
        }
    }
}
