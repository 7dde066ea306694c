use std::sync::Mutex;

use qtrade_core::{Micros, UtcInstant};

use crate::types::{CapitalMode, WithdrawalRecord};

/// Pure decision: should a withdrawal happen, and for how much?
///
/// Returns `None` under [`CapitalMode::Compounding`], when equity hasn't
/// cleared `target_capital + withdrawal_threshold`, or when the minimum
/// interval since `last_withdrawal` hasn't elapsed. The withdrawal amount is
/// capped at `free_cash` — a fixed-capital target never forces a position to
/// be liquidated to fund it.
pub fn maybe_withdraw(
    mode: &CapitalMode,
    equity: Micros,
    free_cash: Micros,
    now: UtcInstant,
    last_withdrawal: Option<UtcInstant>,
) -> Option<Micros> {
    let CapitalMode::Fixed {
        target_capital,
        withdrawal_threshold,
        frequency,
    } = mode
    else {
        return None;
    };

    if equity < target_capital.saturating_add(*withdrawal_threshold) {
        return None;
    }

    if let Some(last) = last_withdrawal {
        let elapsed_days = now.duration_since(last).num_days();
        if elapsed_days < frequency.min_interval_days() {
            return None;
        }
    }

    let desired = equity.saturating_sub(*target_capital);
    if desired.is_zero() || desired.is_negative() {
        return None;
    }

    let amount = desired.min(free_cash);
    if amount.is_zero() || amount.is_negative() {
        return None;
    }
    Some(amount)
}

struct CapitalLedgerState {
    last_withdrawal: Option<UtcInstant>,
    records: Vec<WithdrawalRecord>,
}

/// Stateful wrapper around [`maybe_withdraw`] tracking withdrawal history for
/// one session.
pub struct CapitalLedger {
    mode: CapitalMode,
    state: Mutex<CapitalLedgerState>,
}

impl CapitalLedger {
    pub fn new(mode: CapitalMode) -> Self {
        Self {
            mode,
            state: Mutex::new(CapitalLedgerState {
                last_withdrawal: None,
                records: Vec::new(),
            }),
        }
    }

    pub fn restore(mode: CapitalMode, last_withdrawal: Option<UtcInstant>, records: Vec<WithdrawalRecord>) -> Self {
        Self {
            mode,
            state: Mutex::new(CapitalLedgerState {
                last_withdrawal,
                records,
            }),
        }
    }

    /// Check and, if due, apply a withdrawal, appending an audit record.
    /// Returns the withdrawn amount, if any.
    pub fn check_and_withdraw(&self, equity: Micros, free_cash: Micros, now: UtcInstant) -> Option<Micros> {
        let mut state = self.state.lock().expect("capital ledger mutex poisoned");
        let amount = maybe_withdraw(&self.mode, equity, free_cash, now, state.last_withdrawal)?;
        state.last_withdrawal = Some(now);
        state.records.push(WithdrawalRecord {
            amount,
            equity_before: equity,
            timestamp: now,
        });
        Some(amount)
    }

    pub fn records(&self) -> Vec<WithdrawalRecord> {
        self.state.lock().expect("capital ledger mutex poisoned").records.clone()
    }

    pub fn last_withdrawal(&self) -> Option<UtcInstant> {
        self.state.lock().expect("capital ledger mutex poisoned").last_withdrawal
    }
}
