//! Weighted-average cost-basis fill accounting.
//!
//! A single fill can open a flat position, increase an existing one, reduce
//! it toward flat, or reverse through flat to the opposite side. These are
//! mutually exclusive and must be checked in the order below: a reversal also
//! satisfies "sign differs" but is not a mere reduction, so the reversal
//! check runs first.

use qtrade_core::Micros;
use qtrade_types::{ExecutionReport, Position, Side};

use crate::error::PortfolioError;
use crate::types::{PortfolioState, TradeLogEntry};

/// Apply one execution report to `state`, updating cash, the position map,
/// and cumulative PnL/commission counters. Returns the realized PnL
/// attributable to this fill (`Micros::ZERO` for a pure open or increase).
pub fn apply_fill(
    state: &mut PortfolioState,
    report: &ExecutionReport,
) -> Result<Micros, PortfolioError> {
    let delta_qty = match report.side {
        Side::Buy => report.filled_quantity,
        Side::Sell => -report.filled_quantity,
    };

    let notional = report.fill_price.mul_amount(report.filled_quantity) * report.multiplier;
    let cash_delta = -notional - report.commission;
    let cash_after = state.cash.saturating_add(cash_delta);

    let existing = state.positions.get(&report.symbol).cloned();
    let (q0, c0) = existing
        .as_ref()
        .map(|p| (p.quantity, p.average_cost))
        .unwrap_or((Micros::ZERO, Micros::ZERO));

    let q_new = q0 + delta_qty;
    let realized = realize_fill(
        state,
        report,
        q0,
        c0,
        delta_qty,
        q_new,
        existing.as_ref(),
    )?;

    state.cash = cash_after;
    state.realized_pnl_cumulative = state.realized_pnl_cumulative.saturating_add(realized);
    state.commissions_paid_cumulative = state
        .commissions_paid_cumulative
        .saturating_add(report.commission);
    state.trade_log.push(TradeLogEntry {
        client_order_id: report.client_order_id.clone(),
        symbol: report.symbol.clone(),
        side: report.side,
        fill_price: report.fill_price,
        filled_quantity: report.filled_quantity,
        commission: report.commission,
        multiplier: report.multiplier,
        realized_pnl: realized,
        cash_after,
        timestamp: report.timestamp,
    });

    Ok(realized)
}

#[allow(clippy::too_many_arguments)]
fn realize_fill(
    state: &mut PortfolioState,
    report: &ExecutionReport,
    q0: Micros,
    c0: Micros,
    delta_qty: Micros,
    q_new: Micros,
    existing: Option<&Position>,
) -> Result<Micros, PortfolioError> {
    let m = report.multiplier;
    let p = report.fill_price;

    if q0.is_zero() {
        // Case 1: open from flat.
        state.positions.insert(
            report.symbol.clone(),
            Position::new(report.symbol.clone(), q_new, p, m, report.timestamp),
        );
        return Ok(Micros::ZERO);
    }

    let sign0 = q0.signum();

    if !q_new.is_zero() && q_new.signum() != sign0 {
        // Case 2: reversal. The entire existing position closes at c0, then
        // a new position opens on the far side at the fill price.
        let closed_qty = q0.abs();
        let realized = (p - c0) * sign0 * m;
        let realized = realized.mul_amount(closed_qty);
        state.positions.insert(
            report.symbol.clone(),
            Position::new(report.symbol.clone(), q_new, p, m, report.timestamp),
        );
        return Ok(realized);
    }

    if delta_qty.signum() != sign0 {
        // Case 3: reduction toward (possibly exactly to) flat.
        let closed_qty = delta_qty.abs().min(q0.abs());
        let realized = (p - c0) * sign0 * m;
        let realized = realized.mul_amount(closed_qty);
        if q_new.is_zero() {
            state.positions.remove(&report.symbol);
        } else {
            let mut pos = existing
                .cloned()
                .ok_or_else(|| PortfolioError::MissingPosition(report.symbol.clone()))?;
            pos.quantity = q_new;
            pos.entry_timestamp = report.timestamp;
            state.positions.insert(report.symbol.clone(), pos);
        }
        return Ok(realized);
    }

    // Case 4: increase in the same direction — weighted-average cost basis.
    let new_cost = c0.weighted_average_micros(q0.abs(), p, delta_qty.abs());
    let mut pos = existing
        .cloned()
        .ok_or_else(|| PortfolioError::MissingPosition(report.symbol.clone()))?;
    pos.quantity = q_new;
    pos.average_cost = new_cost;
    state.positions.insert(report.symbol.clone(), pos);
    Ok(Micros::ZERO)
}

/// Unrealized PnL across all open positions at the given marks.
pub fn unrealized_pnl(
    state: &PortfolioState,
    marks: &std::collections::BTreeMap<String, Micros>,
) -> Result<Micros, PortfolioError> {
    let mut total = Micros::ZERO;
    for (symbol, pos) in &state.positions {
        let mark = marks
            .get(symbol)
            .ok_or_else(|| PortfolioError::MissingMarkPrice(symbol.clone()))?;
        let pnl = (*mark - pos.average_cost) * pos.quantity.signum() * pos.multiplier;
        total = total.saturating_add(pnl.mul_amount(pos.quantity.abs()));
    }
    Ok(total)
}

/// Equity = cash + mark-to-market notional of every open position (not cash
/// plus unrealized PnL — cash already reflects the cost paid for the
/// position, so equity must add the position's full current market value,
/// not just its gain/loss over cost).
pub fn equity(
    state: &PortfolioState,
    marks: &std::collections::BTreeMap<String, Micros>,
) -> Result<Micros, PortfolioError> {
    let mut total = state.cash;
    for (symbol, pos) in &state.positions {
        let mark = marks
            .get(symbol)
            .ok_or_else(|| PortfolioError::MissingMarkPrice(symbol.clone()))?;
        total = total.saturating_add(pos.notional(*mark));
    }
    Ok(total)
}

/// Replays the trade log from an empty ledger and checks it reproduces the
/// current cash balance and realized PnL exactly. O(n) in trade log length.
pub fn verify_integrity(state: &PortfolioState) -> Result<(), PortfolioError> {
    let mut replay = PortfolioState::new(Micros::ZERO);
    for entry in &state.trade_log {
        let report = ExecutionReport {
            client_order_id: entry.client_order_id.clone(),
            symbol: entry.symbol.clone(),
            side: entry.side,
            fill_price: entry.fill_price,
            filled_quantity: entry.filled_quantity,
            commission: entry.commission,
            multiplier: entry.multiplier,
            timestamp: entry.timestamp,
        };
        apply_fill(&mut replay, &report)?;
    }
    if replay.realized_pnl_cumulative != state.realized_pnl_cumulative {
        return Err(PortfolioError::IntegrityViolation(format!(
            "replayed realized PnL {} does not match recorded {}",
            replay.realized_pnl_cumulative, state.realized_pnl_cumulative
        )));
    }
    Ok(())
}
