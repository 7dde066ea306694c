//! Mutex-guarded risk engine facade.
//!
//! Rust's `std::sync::Mutex` is not reentrant, so `register_trade`'s "may
//! halt internally" requirement is met by doing all of its work — P&L
//! update, peak-equity update, and any resulting halt — inside the single
//! lock acquisition for that call, rather than by re-entering the lock.

use std::sync::Mutex;

use qtrade_core::{Micros, UtcInstant};

use crate::engine;
use crate::state::RiskState;
use crate::types::{HaltReason, PreTradeInput, RiskConfig, RiskDecision};

pub struct RiskEngine {
    cfg: RiskConfig,
    state: Mutex<RiskState>,
}

impl RiskEngine {
    pub fn new(cfg: RiskConfig, starting_equity: Micros) -> Self {
        Self {
            cfg,
            state: Mutex::new(RiskState::new(starting_equity)),
        }
    }

    pub fn pre_trade_check(&self, input: &PreTradeInput) -> RiskDecision {
        let state = self.state.lock().expect("risk mutex poisoned");
        engine::evaluate(&self.cfg, &state, input)
    }

    pub fn register_trade(&self, realized_pnl: Micros, commission: Micros, equity: Micros) {
        let mut state = self.state.lock().expect("risk mutex poisoned");
        engine::register_trade(&self.cfg, &mut state, realized_pnl, commission, equity);
    }

    pub fn record_order_submission(&self, timestamp: UtcInstant) {
        let mut state = self.state.lock().expect("risk mutex poisoned");
        state.record_order_submission(timestamp, self.cfg.window_seconds);
    }

    pub fn daily_reset(&self, timestamp: UtcInstant, equity: Micros) {
        let mut state = self.state.lock().expect("risk mutex poisoned");
        state.daily_reset(timestamp, equity);
    }

    pub fn halt(&self, reason: HaltReason) {
        self.state.lock().expect("risk mutex poisoned").halt(reason);
    }

    pub fn resume(&self) {
        self.state.lock().expect("risk mutex poisoned").resume();
    }

    pub fn is_halted(&self) -> bool {
        self.state.lock().expect("risk mutex poisoned").is_halted()
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.state.lock().expect("risk mutex poisoned").halt_reason()
    }

    pub fn snapshot_state(&self) -> RiskState {
        self.state.lock().expect("risk mutex poisoned").clone()
    }

    pub fn restore_state(&self, state: RiskState) {
        *self.state.lock().expect("risk mutex poisoned") = state;
    }
}
