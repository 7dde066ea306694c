use std::collections::BTreeMap;

use qtrade_core::Micros;
use qtrade_reconcile::{apply_if_configured, reconcile, PositionMap, ReconcileConfig, ReconcileOutcome};

fn map(pairs: &[(&str, i64)]) -> PositionMap {
    let mut m = BTreeMap::new();
    for (symbol, qty) in pairs {
        m.insert(symbol.to_string(), Micros::from_units(*qty));
    }
    m
}

#[test]
fn mismatch_below_threshold_is_clean() {
    let cfg = ReconcileConfig::default();
    let internal = map(&[("AAPL", 100)]);
    let broker = map(&[("AAPL", 95)]); // 5/95 ≈ 5.3% < 10%
    let outcome = reconcile(&cfg, &internal, &broker);
    assert!(outcome.is_clean());
}

#[test]
fn mismatch_at_or_above_threshold_halts() {
    let cfg = ReconcileConfig::default();
    let internal = map(&[("AAPL", 120)]);
    let broker = map(&[("AAPL", 100)]); // 20/100 = 20% >= 10%
    let outcome = reconcile(&cfg, &internal, &broker);
    assert!(matches!(outcome, ReconcileOutcome::Halt { .. }));
}

#[test]
fn symbol_only_known_to_broker_is_compared_against_zero() {
    let cfg = ReconcileConfig::default();
    let internal = map(&[]);
    let broker = map(&[("MSFT", 50)]);
    let outcome = reconcile(&cfg, &internal, &broker);
    assert!(matches!(outcome, ReconcileOutcome::Halt { .. }));
}

#[test]
fn clean_with_overwrite_enabled_replaces_internal_quantities() {
    let cfg = ReconcileConfig {
        overwrite_from_broker: true,
        ..ReconcileConfig::default()
    };
    let mut internal = map(&[("AAPL", 102)]);
    let broker = map(&[("AAPL", 100)]);
    let outcome = reconcile(&cfg, &internal, &broker);
    assert!(outcome.is_clean());

    apply_if_configured(&cfg, &mut internal, &broker, &outcome);
    assert_eq!(internal.get("AAPL"), Some(&Micros::from_units(100)));
}

#[test]
fn halted_outcome_never_overwrites_even_if_configured() {
    let cfg = ReconcileConfig {
        overwrite_from_broker: true,
        ..ReconcileConfig::default()
    };
    let mut internal = map(&[("AAPL", 200)]);
    let broker = map(&[("AAPL", 100)]);
    let outcome = reconcile(&cfg, &internal, &broker);
    assert!(!outcome.is_clean());

    apply_if_configured(&cfg, &mut internal, &broker, &outcome);
    assert_eq!(internal.get("AAPL"), Some(&Micros::from_units(200)));
}
