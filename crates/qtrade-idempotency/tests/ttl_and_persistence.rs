use chrono::{TimeZone, Utc};
use qtrade_core::UtcInstant;
use qtrade_idempotency::IdempotencyTracker;

fn ts(seconds: i64) -> UtcInstant {
    UtcInstant::from_utc(Utc.timestamp_opt(seconds, 0).unwrap())
}

#[test]
fn duplicate_within_ttl_is_flagged_expired_is_not() {
    let tracker = IdempotencyTracker::new(30);
    tracker.mark_submitted("abc123", ts(0)).unwrap();

    assert!(tracker.is_duplicate("abc123", ts(10)));
    assert!(!tracker.is_duplicate("abc123", ts(31)));
    assert!(!tracker.is_duplicate("unseen-id", ts(10)));
}

#[test]
fn sweep_expired_removes_stale_entries_only() {
    let tracker = IdempotencyTracker::new(30);
    tracker.mark_submitted("old", ts(0)).unwrap();
    tracker.mark_submitted("fresh", ts(100)).unwrap();

    tracker.sweep_expired(ts(100));
    assert_eq!(tracker.len(), 1);
    assert!(!tracker.is_duplicate("old", ts(100)));
    assert!(tracker.is_duplicate("fresh", ts(100)));
}

#[test]
fn persisted_table_survives_reload() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("idempotency.json");

    {
        let tracker = IdempotencyTracker::with_persistence(30, &path).unwrap();
        tracker.mark_submitted("abc123", ts(0)).unwrap();
    }

    let reloaded = IdempotencyTracker::with_persistence(30, &path).unwrap();
    assert!(reloaded.is_duplicate("abc123", ts(10)));
}
