use chrono::{TimeZone, Utc};
use qtrade_capital::{CapitalLedger, CapitalMode, WithdrawalFrequency};
use qtrade_core::{Micros, UtcInstant};

fn ts(day: u32) -> UtcInstant {
    UtcInstant::from_utc(Utc.with_ymd_and_hms(2026, 1, day, 12, 0, 0).unwrap())
}

fn fixed_mode() -> CapitalMode {
    CapitalMode::Fixed {
        target_capital: Micros::from_units(100_000),
        withdrawal_threshold: Micros::from_units(5_000),
        frequency: WithdrawalFrequency::Weekly,
    }
}

#[test]
fn compounding_mode_never_withdraws() {
    let ledger = CapitalLedger::new(CapitalMode::Compounding);
    let result = ledger.check_and_withdraw(Micros::from_units(1_000_000), Micros::from_units(1_000_000), ts(1));
    assert_eq!(result, None);
}

#[test]
fn fixed_mode_withdraws_excess_once_threshold_cleared() {
    let ledger = CapitalLedger::new(fixed_mode());
    // equity 106,000 >= target 100,000 + threshold 5,000
    let result = ledger.check_and_withdraw(Micros::from_units(106_000), Micros::from_units(50_000), ts(1));
    assert_eq!(result, Some(Micros::from_units(6_000)));
    assert_eq!(ledger.records().len(), 1);
}

#[test]
fn fixed_mode_does_not_withdraw_below_threshold() {
    let ledger = CapitalLedger::new(fixed_mode());
    let result = ledger.check_and_withdraw(Micros::from_units(102_000), Micros::from_units(50_000), ts(1));
    assert_eq!(result, None);
}

#[test]
fn withdrawal_never_exceeds_free_cash() {
    let ledger = CapitalLedger::new(fixed_mode());
    // Desired withdrawal is 6,000 but only 2,000 of free cash is available.
    let result = ledger.check_and_withdraw(Micros::from_units(106_000), Micros::from_units(2_000), ts(1));
    assert_eq!(result, Some(Micros::from_units(2_000)));
}

#[test]
fn second_withdrawal_within_frequency_window_is_skipped() {
    let ledger = CapitalLedger::new(fixed_mode());
    let first = ledger.check_and_withdraw(Micros::from_units(110_000), Micros::from_units(50_000), ts(1));
    assert!(first.is_some());

    // Only 2 days later, weekly frequency requires 7.
    let second = ledger.check_and_withdraw(Micros::from_units(115_000), Micros::from_units(50_000), ts(3));
    assert_eq!(second, None);

    let third = ledger.check_and_withdraw(Micros::from_units(115_000), Micros::from_units(50_000), ts(9));
    assert!(third.is_some());
}
