//! Mutex-guarded portfolio facade.
//!
//! One lock acquisition per public call — callers needing a consistent view
//! across a fill-then-equity sequence should call [`Portfolio::snapshot`] and
//! work from the copy rather than chaining calls.

use std::sync::Mutex;

use qtrade_core::{Micros, UtcInstant};
use qtrade_types::{ExecutionReport, Position};

use crate::accounting;
use crate::error::PortfolioError;
use crate::types::{CashEntry, MarkMap, PortfolioSnapshot, PortfolioState};

pub struct Portfolio {
    state: Mutex<PortfolioState>,
}

impl Portfolio {
    pub fn new(initial_cash: Micros) -> Self {
        Self {
            state: Mutex::new(PortfolioState::new(initial_cash)),
        }
    }

    pub fn from_snapshot(snapshot: PortfolioSnapshot) -> Self {
        Self {
            state: Mutex::new(snapshot.into()),
        }
    }

    /// Apply one execution report, returning the realized PnL this fill
    /// produced (`Micros::ZERO` for an opening or same-direction increase).
    pub fn apply_fill(&self, report: &ExecutionReport) -> Result<Micros, PortfolioError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        accounting::apply_fill(&mut state, report)
    }

    pub fn deposit_cash(&self, amount: Micros, reason: &str, at: UtcInstant) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        state.cash = state.cash.saturating_add(amount);
        let cash_after = state.cash;
        state.cash_log.push(CashEntry {
            delta: amount,
            cash_after,
            reason: reason.to_string(),
            timestamp: at,
        });
    }

    pub fn withdraw_cash(
        &self,
        amount: Micros,
        reason: &str,
        at: UtcInstant,
    ) -> Result<(), PortfolioError> {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        if amount.raw() > state.cash.raw() {
            return Err(PortfolioError::InsufficientCash {
                requested: amount.to_string(),
                available: state.cash.to_string(),
            });
        }
        state.cash = state.cash.saturating_sub(amount);
        let cash_after = state.cash;
        state.cash_log.push(CashEntry {
            delta: -amount,
            cash_after,
            reason: reason.to_string(),
            timestamp: at,
        });
        Ok(())
    }

    pub fn cash(&self) -> Micros {
        self.state.lock().expect("portfolio mutex poisoned").cash
    }

    pub fn position(&self, symbol: &str) -> Option<Position> {
        self.state
            .lock()
            .expect("portfolio mutex poisoned")
            .positions
            .get(symbol)
            .cloned()
    }

    pub fn open_position_count(&self) -> usize {
        self.state
            .lock()
            .expect("portfolio mutex poisoned")
            .positions
            .len()
    }

    pub fn realized_pnl_cumulative(&self) -> Micros {
        self.state
            .lock()
            .expect("portfolio mutex poisoned")
            .realized_pnl_cumulative
    }

    pub fn get_equity(&self, marks: &MarkMap) -> Result<Micros, PortfolioError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        accounting::equity(&state, marks)
    }

    pub fn unrealized_pnl(&self, marks: &MarkMap) -> Result<Micros, PortfolioError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        accounting::unrealized_pnl(&state, marks)
    }

    pub fn snapshot(&self) -> PortfolioSnapshot {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        PortfolioSnapshot::from(&*state)
    }

    pub fn restore(&self, snapshot: PortfolioSnapshot) {
        let mut state = self.state.lock().expect("portfolio mutex poisoned");
        *state = snapshot.into();
    }

    pub fn verify_integrity(&self) -> Result<(), PortfolioError> {
        let state = self.state.lock().expect("portfolio mutex poisoned");
        accounting::verify_integrity(&state)
    }
}
