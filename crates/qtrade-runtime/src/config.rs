//! Coordinator-only tunables — knobs that don't belong to any constituent
//! facade's own config because they govern how the coordinator drives them.

use std::time::Duration;

use qtrade_core::Micros;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoordinatorConfig {
    /// Save a checkpoint after this many processed bar events, in addition
    /// to the unconditional save on every fill.
    pub checkpoint_every_n_events: u64,
    /// How often (in processed bar events) to run the capital manager's
    /// withdrawal check.
    pub capital_check_every_n_events: u64,
    /// Timeout for the startup reconcile_positions call.
    pub reconcile_timeout: Duration,
    /// Consecutive checkpoint-save failures before the coordinator escalates
    /// to a warning (trading is not blocked — matches spec §7).
    pub consecutive_checkpoint_failure_threshold: u32,
    /// Bound on the final blocking drain during `stop()`.
    pub checkpoint_drain_timeout: Duration,
    /// Flat commission estimate fed into pre-trade risk checks; the actual
    /// commission realized on fill comes from the broker's execution report.
    pub estimated_commission_per_order: Micros,
}

impl Default for CoordinatorConfig {
    fn default() -> Self {
        Self {
            checkpoint_every_n_events: 100,
            capital_check_every_n_events: 1_000,
            reconcile_timeout: Duration::from_secs(10),
            consecutive_checkpoint_failure_threshold: 5,
            checkpoint_drain_timeout: Duration::from_secs(10),
            estimated_commission_per_order: Micros::ZERO,
        }
    }
}
