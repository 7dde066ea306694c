use std::collections::BTreeSet;

use qtrade_core::Micros;

use crate::types::{PositionDelta, PositionMap, ReconcileConfig, ReconcileOutcome};

/// Compare internal vs. broker-reported positions over the union of symbols
/// known to either side. Missing entries are treated as flat (zero).
pub fn reconcile(cfg: &ReconcileConfig, internal: &PositionMap, broker: &PositionMap) -> ReconcileOutcome {
    let mut symbols: BTreeSet<&String> = BTreeSet::new();
    symbols.extend(internal.keys());
    symbols.extend(broker.keys());

    let one_share = Micros::from_units(1);
    let mut deltas = Vec::with_capacity(symbols.len());
    let mut worst_ratio = 0.0f64;

    for symbol in symbols {
        let internal_qty = *internal.get(symbol).unwrap_or(&Micros::ZERO);
        let broker_qty = *broker.get(symbol).unwrap_or(&Micros::ZERO);
        let denominator = broker_qty.abs().max(one_share);
        let delta_ratio = internal_qty.saturating_sub(broker_qty).abs().ratio(denominator);

        worst_ratio = worst_ratio.max(delta_ratio);
        deltas.push(PositionDelta {
            symbol: symbol.clone(),
            internal_qty,
            broker_qty,
            delta_ratio,
        });
    }

    if worst_ratio >= cfg.critical_mismatch_threshold {
        ReconcileOutcome::Halt { deltas }
    } else {
        ReconcileOutcome::Clean { deltas }
    }
}

/// Applies a clean reconcile's broker quantities onto `internal`, when
/// `cfg.overwrite_from_broker` is set. No-op on a `Halt` outcome — a halted
/// reconcile must be resolved by an operator, not silently papered over.
pub fn apply_if_configured(cfg: &ReconcileConfig, internal: &mut PositionMap, broker: &PositionMap, outcome: &ReconcileOutcome) {
    if !cfg.overwrite_from_broker || !outcome.is_clean() {
        return;
    }
    for delta in outcome.deltas() {
        match broker.get(&delta.symbol) {
            Some(&qty) if !qty.is_zero() => {
                internal.insert(delta.symbol.clone(), qty);
            }
            _ => {
                internal.remove(&delta.symbol);
            }
        }
    }
}
