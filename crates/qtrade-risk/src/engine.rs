//! Ordered pre-trade checks and trade-outcome bookkeeping.
//!
//! `evaluate` runs the seven checks in a fixed order; the first failing
//! check short-circuits the rest.

use qtrade_core::Micros;

use crate::state::RiskState;
use crate::types::{HaltReason, PreTradeInput, RejectionReason, RiskConfig, RiskDecision};

/// Core decision function. Pure given `(cfg, state, input)` — all mutation
/// (the sliding submission window, halt transitions) happens in the other
/// `RiskState` methods the coordinator calls around this one.
pub fn evaluate(cfg: &RiskConfig, state: &RiskState, input: &PreTradeInput) -> RiskDecision {
    // 1. Halted, unless this is a reducing order during a daily-loss/drawdown
    // halt that opposes the current position (i.e. flattens toward zero).
    if let Some(reason) = state.halted {
        let is_permitted_reduction = matches!(reason, HaltReason::DailyLoss | HaltReason::Drawdown)
            && !input.current_position_quantity.is_zero()
            && input.delta_quantity.signum() != input.current_position_quantity.signum();
        if !is_permitted_reduction {
            return RiskDecision::Reject(RejectionReason::Halted);
        }
    }

    // 2. Position size cap.
    let new_position_quantity = input.current_position_quantity + input.delta_quantity;
    let new_notional = input
        .price
        .mul_amount(new_position_quantity.abs())
        .mul_multiplier(input.multiplier);
    let position_cap = input.equity.mul_frac(
        (cfg.max_position_pct * qtrade_core::MICROS_SCALE as f64).round() as i64,
        qtrade_core::MICROS_SCALE,
    );
    if new_notional.raw() > position_cap.raw() {
        return RiskDecision::Reject(RejectionReason::PositionLimit);
    }

    // 3. Concurrent positions cap.
    if input.opens_new_symbol && input.active_position_count >= cfg.max_concurrent_positions {
        return RiskDecision::Reject(RejectionReason::ConcurrentPositions);
    }

    // 4. Order rate limit. Counted against the window as of `input.timestamp`
    // rather than `state.submission_window.len()` directly — the window is
    // only physically pruned when a new submission is recorded, so a stale
    // count would reject orders the window has actually slid past.
    let in_window_count = state
        .submission_window
        .iter()
        .filter(|&&submitted_at| {
            input.timestamp.duration_since(submitted_at).num_seconds() < cfg.window_seconds
        })
        .count();
    if in_window_count >= cfg.max_orders_per_window {
        return RiskDecision::Reject(RejectionReason::RateLimit);
    }

    // 5. Minimum-balance protection.
    if cfg.min_balance_enabled {
        let notional = input
            .price
            .mul_amount(input.delta_quantity.abs())
            .mul_multiplier(input.multiplier);
        let cash_delta = -(notional) - input.commission;
        let projected_equity = input.equity.saturating_add(cash_delta);
        if projected_equity.raw() < cfg.minimum_balance.raw() {
            return RiskDecision::Reject(RejectionReason::MinBalance);
        }
    }

    // 6. Daily-loss guard. Profits never trigger a halt here: only a
    // cumulative loss beyond the threshold rejects.
    let notional = input
        .price
        .mul_amount(input.delta_quantity.abs())
        .mul_multiplier(input.multiplier);
    let projected_cost = notional.saturating_add(input.commission);
    let daily_loss_floor = state.daily_start_equity.mul_frac(
        (cfg.max_daily_loss_pct * qtrade_core::MICROS_SCALE as f64).round() as i64,
        qtrade_core::MICROS_SCALE,
    );
    if (state.daily_realized_pnl - projected_cost).raw() <= -daily_loss_floor.raw() {
        return RiskDecision::Reject(RejectionReason::DailyLoss);
    }

    // 7. Drawdown guard.
    if state.peak_equity.raw() > 0 {
        let drawdown = state.peak_equity.saturating_sub(input.equity);
        let drawdown_limit = state.peak_equity.mul_frac(
            (cfg.max_drawdown_pct * qtrade_core::MICROS_SCALE as f64).round() as i64,
            qtrade_core::MICROS_SCALE,
        );
        if drawdown.raw() >= drawdown_limit.raw() {
            return RiskDecision::Reject(RejectionReason::Drawdown);
        }
    }

    RiskDecision::Accept
}

/// Updates daily realized P&L and peak equity after a fill, transitioning
/// to a halted state if the new totals breach the daily-loss or drawdown
/// thresholds. Profits alone never halt.
pub fn register_trade(
    cfg: &RiskConfig,
    state: &mut RiskState,
    realized_pnl: Micros,
    commission: Micros,
    equity: Micros,
) {
    state.daily_realized_pnl = state
        .daily_realized_pnl
        .saturating_add(realized_pnl)
        .saturating_sub(commission);
    state.peak_equity = state.peak_equity.max(equity);

    if state.halted.is_none() {
        let daily_loss_floor = state.daily_start_equity.mul_frac(
            (cfg.max_daily_loss_pct * qtrade_core::MICROS_SCALE as f64).round() as i64,
            qtrade_core::MICROS_SCALE,
        );
        if state.daily_realized_pnl.raw() <= -daily_loss_floor.raw() {
            state.halt(HaltReason::DailyLoss);
            return;
        }
        if state.peak_equity.raw() > 0 {
            let drawdown = state.peak_equity.saturating_sub(equity);
            let drawdown_limit = state.peak_equity.mul_frac(
                (cfg.max_drawdown_pct * qtrade_core::MICROS_SCALE as f64).round() as i64,
                qtrade_core::MICROS_SCALE,
            );
            if drawdown.raw() >= drawdown_limit.raw() {
                state.halt(HaltReason::Drawdown);
            }
        }
    }
}
