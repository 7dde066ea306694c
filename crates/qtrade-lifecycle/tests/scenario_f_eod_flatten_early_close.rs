//! Scenario F: session closes 17:00Z regularly, 14:00Z on a holiday. With
//! `eod_minutes_before_close=15`, flatten fires once at 13:45Z on the
//! holiday, 16:45Z otherwise, and does not re-fire until the UTC date
//! advances.

use chrono::{NaiveDate, TimeZone, Utc};
use qtrade_core::UtcInstant;
use qtrade_lifecycle::{EodFlattenSchedule, SessionCalendar};

struct Calendar {
    holiday: NaiveDate,
}

impl SessionCalendar for Calendar {
    fn close_time(&self, date: NaiveDate) -> UtcInstant {
        let hour = if date == self.holiday { 14 } else { 17 };
        UtcInstant::from_utc(Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap()))
    }
}

fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32) -> UtcInstant {
    UtcInstant::from_utc(Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap())
}

#[test]
fn holiday_flattens_at_thirteen_forty_five_regular_day_at_sixteen_forty_five() {
    let holiday = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
    let calendar = Calendar { holiday };
    let schedule = EodFlattenSchedule::new(15);

    assert!(schedule.should_flatten(&calendar, ts(2026, 3, 10, 13, 45)));
    // Already fired today — no re-fire even well past close.
    assert!(!schedule.should_flatten(&calendar, ts(2026, 3, 10, 16, 0)));

    let regular_calendar = Calendar { holiday };
    assert!(!schedule.should_flatten(&regular_calendar, ts(2026, 3, 11, 16, 44)));
    assert!(schedule.should_flatten(&regular_calendar, ts(2026, 3, 11, 16, 45)));
}
