use std::collections::BTreeMap;

use qtrade_core::Micros;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReconcileConfig {
    /// Max allowed `|internal - broker| / max(|broker|, 1 share)` before
    /// halting. Default 0.10 per spec.
    pub critical_mismatch_threshold: f64,
    /// When true, a clean (below-threshold) reconcile overwrites internal
    /// quantities with the broker's authoritative figures.
    pub overwrite_from_broker: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            critical_mismatch_threshold: 0.10,
            overwrite_from_broker: false,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PositionDelta {
    pub symbol: String,
    pub internal_qty: Micros,
    pub broker_qty: Micros,
    /// `|internal_qty - broker_qty| / max(|broker_qty|, 1 share)`, a
    /// reporting/threshold-comparison ratio — not ledger arithmetic.
    pub delta_ratio: f64,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReconcileOutcome {
    Clean { deltas: Vec<PositionDelta> },
    Halt { deltas: Vec<PositionDelta> },
}

impl ReconcileOutcome {
    pub fn is_clean(&self) -> bool {
        matches!(self, Self::Clean { .. })
    }

    pub fn deltas(&self) -> &[PositionDelta] {
        match self {
            Self::Clean { deltas } | Self::Halt { deltas } => deltas,
        }
    }
}

pub type PositionMap = BTreeMap<String, Micros>;
