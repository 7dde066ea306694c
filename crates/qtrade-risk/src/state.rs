//! Mutable risk state: halt status, daily P&L tracking, peak equity, and the
//! sliding order-submission window.

use std::collections::VecDeque;

use chrono::NaiveDate;
use qtrade_core::{Micros, UtcInstant};
use serde::{Deserialize, Serialize};

use crate::types::HaltReason;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskState {
    pub halted: Option<HaltReason>,
    pub current_date: Option<NaiveDate>,
    pub daily_start_equity: Micros,
    pub daily_realized_pnl: Micros,
    pub peak_equity: Micros,
    pub submission_window: VecDeque<UtcInstant>,
}

impl Default for RiskState {
    fn default() -> Self {
        Self {
            halted: None,
            current_date: None,
            daily_start_equity: Micros::ZERO,
            daily_realized_pnl: Micros::ZERO,
            peak_equity: Micros::ZERO,
            submission_window: VecDeque::new(),
        }
    }
}

impl RiskState {
    pub fn new(starting_equity: Micros) -> Self {
        Self {
            peak_equity: starting_equity,
            daily_start_equity: starting_equity,
            ..Default::default()
        }
    }

    pub fn is_halted(&self) -> bool {
        self.halted.is_some()
    }

    pub fn halt_reason(&self) -> Option<HaltReason> {
        self.halted
    }

    pub fn halt(&mut self, reason: HaltReason) {
        self.halted = Some(reason);
    }

    pub fn resume(&mut self) {
        self.halted = None;
    }

    /// Rotates the trading day when `timestamp`'s UTC calendar date has
    /// advanced past `current_date`. Resets `daily_start_equity` and
    /// `daily_realized_pnl`; auto-resumes a `HaltReason::DailyLoss` halt.
    pub fn daily_reset(&mut self, timestamp: UtcInstant, equity: Micros) {
        let date = timestamp.date();
        let is_new_day = match self.current_date {
            None => true,
            Some(prev) => date > prev,
        };
        if !is_new_day {
            return;
        }
        self.current_date = Some(date);
        self.daily_start_equity = equity;
        self.daily_realized_pnl = Micros::ZERO;
        if matches!(self.halted, Some(reason) if reason.auto_resumes_on_new_day()) {
            self.halted = None;
        }
    }

    pub fn record_order_submission(&mut self, timestamp: UtcInstant, window_seconds: i64) {
        self.submission_window.push_back(timestamp);
        self.prune_submission_window(timestamp, window_seconds);
    }

    pub fn prune_submission_window(&mut self, now: UtcInstant, window_seconds: i64) {
        while let Some(&front) = self.submission_window.front() {
            if now.duration_since(front).num_seconds() >= window_seconds {
                self.submission_window.pop_front();
            } else {
                break;
            }
        }
    }
}
