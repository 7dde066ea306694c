//! Portfolio state value types: trade log entries and the checkpointable
//! snapshot shape.

use std::collections::BTreeMap;

use qtrade_core::{Micros, UtcInstant};
use qtrade_types::{Position, Side};
use serde::{Deserialize, Serialize};

/// One applied fill, recorded for audit and for `verify_integrity`'s replay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeLogEntry {
    pub client_order_id: String,
    pub symbol: String,
    pub side: Side,
    pub fill_price: Micros,
    pub filled_quantity: Micros,
    pub commission: Micros,
    pub multiplier: i64,
    pub realized_pnl: Micros,
    pub cash_after: Micros,
    pub timestamp: UtcInstant,
}

/// A cash movement not tied to a fill (deposit or withdrawal).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashEntry {
    pub delta: Micros,
    pub cash_after: Micros,
    pub reason: String,
    pub timestamp: UtcInstant,
}

/// Mutable state guarded by the [`crate::Portfolio`] mutex.
#[derive(Clone, Debug, Default)]
pub struct PortfolioState {
    pub cash: Micros,
    pub positions: BTreeMap<String, Position>,
    pub realized_pnl_cumulative: Micros,
    pub commissions_paid_cumulative: Micros,
    pub trade_log: Vec<TradeLogEntry>,
    pub cash_log: Vec<CashEntry>,
}

impl PortfolioState {
    pub fn new(initial_cash: Micros) -> Self {
        Self {
            cash: initial_cash,
            ..Default::default()
        }
    }
}

/// A deep, serializable copy of portfolio state for checkpoint persistence.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PortfolioSnapshot {
    pub cash: Micros,
    pub positions: BTreeMap<String, Position>,
    pub realized_pnl_cumulative: Micros,
    pub commissions_paid_cumulative: Micros,
    pub trade_log: Vec<TradeLogEntry>,
    pub cash_log: Vec<CashEntry>,
}

impl From<&PortfolioState> for PortfolioSnapshot {
    fn from(state: &PortfolioState) -> Self {
        Self {
            cash: state.cash,
            positions: state.positions.clone(),
            realized_pnl_cumulative: state.realized_pnl_cumulative,
            commissions_paid_cumulative: state.commissions_paid_cumulative,
            trade_log: state.trade_log.clone(),
            cash_log: state.cash_log.clone(),
        }
    }
}

impl From<PortfolioSnapshot> for PortfolioState {
    fn from(snap: PortfolioSnapshot) -> Self {
        Self {
            cash: snap.cash,
            positions: snap.positions,
            realized_pnl_cumulative: snap.realized_pnl_cumulative,
            commissions_paid_cumulative: snap.commissions_paid_cumulative,
            trade_log: snap.trade_log,
            cash_log: snap.cash_log,
        }
    }
}

/// Mark-to-market prices keyed by symbol, supplied by the caller at each
/// equity computation — the portfolio never sources its own prices.
pub type MarkMap = BTreeMap<String, Micros>;
