//! qtrade-reconcile
//!
//! Position reconciliation against a broker's authoritative view: per-symbol
//! delta-ratio comparison, halting when any symbol's mismatch exceeds the
//! configured threshold.

mod engine;
mod types;

pub use engine::{apply_if_configured, reconcile};
pub use types::{PositionDelta, PositionMap, ReconcileConfig, ReconcileOutcome};
