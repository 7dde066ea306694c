use std::sync::Mutex;

use chrono::{Duration as ChronoDuration, NaiveDate};
use qtrade_core::UtcInstant;

/// Maps a calendar date to that session's close time, accounting for
/// early closes (holidays, half-days).
pub trait SessionCalendar: Send + Sync {
    fn close_time(&self, date: NaiveDate) -> UtcInstant;
}

struct EodState {
    fired_date: Option<NaiveDate>,
}

/// One-shot-per-day EOD flatten trigger: fires once `minutes_before_close`
/// before the session's close time (early-close-aware via
/// [`SessionCalendar`]), then stays quiet until the UTC calendar date
/// advances.
pub struct EodFlattenSchedule {
    minutes_before_close: i64,
    state: Mutex<EodState>,
}

impl EodFlattenSchedule {
    pub fn new(minutes_before_close: i64) -> Self {
        Self {
            minutes_before_close,
            state: Mutex::new(EodState { fired_date: None }),
        }
    }

    /// Returns `true` exactly once per UTC calendar date, the first time
    /// `now` reaches or passes that date's flatten instant.
    pub fn should_flatten(&self, calendar: &dyn SessionCalendar, now: UtcInstant) -> bool {
        let today = now.date();
        let close = calendar.close_time(today);
        let flatten_at = close.as_utc() - ChronoDuration::minutes(self.minutes_before_close);
        if now.as_utc() < flatten_at {
            return false;
        }

        let mut state = self.state.lock().expect("eod schedule mutex poisoned");
        if state.fired_date == Some(today) {
            return false;
        }

        state.fired_date = Some(today);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    struct FixedCalendar {
        regular_close_hour: u32,
        holiday: NaiveDate,
        holiday_close_hour: u32,
    }

    impl SessionCalendar for FixedCalendar {
        fn close_time(&self, date: NaiveDate) -> UtcInstant {
            let hour = if date == self.holiday {
                self.holiday_close_hour
            } else {
                self.regular_close_hour
            };
            UtcInstant::from_utc(Utc.from_utc_datetime(&date.and_hms_opt(hour, 0, 0).unwrap()))
        }
    }

    fn ts(y: i32, m: u32, d: u32, h: u32, mi: u32) -> UtcInstant {
        UtcInstant::from_utc(Utc.with_ymd_and_hms(y, m, d, h, mi, 0).unwrap())
    }

    #[test]
    fn fires_fifteen_minutes_before_regular_close() {
        let calendar = FixedCalendar {
            regular_close_hour: 17,
            holiday: NaiveDate::from_ymd_opt(2026, 1, 19).unwrap(),
            holiday_close_hour: 14,
        };
        let schedule = EodFlattenSchedule::new(15);

        assert!(!schedule.should_flatten(&calendar, ts(2026, 1, 20, 16, 44)));
        assert!(schedule.should_flatten(&calendar, ts(2026, 1, 20, 16, 45)));
    }

    #[test]
    fn fires_earlier_on_early_close_holiday() {
        let holiday = NaiveDate::from_ymd_opt(2026, 1, 19).unwrap();
        let calendar = FixedCalendar {
            regular_close_hour: 17,
            holiday,
            holiday_close_hour: 14,
        };
        let schedule = EodFlattenSchedule::new(15);

        assert!(!schedule.should_flatten(&calendar, ts(2026, 1, 19, 13, 44)));
        assert!(schedule.should_flatten(&calendar, ts(2026, 1, 19, 13, 45)));
    }

    #[test]
    fn does_not_refire_same_day_but_refires_next_day() {
        let calendar = FixedCalendar {
            regular_close_hour: 17,
            holiday: NaiveDate::from_ymd_opt(2099, 1, 1).unwrap(),
            holiday_close_hour: 14,
        };
        let schedule = EodFlattenSchedule::new(15);

        assert!(schedule.should_flatten(&calendar, ts(2026, 1, 20, 16, 50)));
        assert!(!schedule.should_flatten(&calendar, ts(2026, 1, 20, 16, 55)));
        assert!(schedule.should_flatten(&calendar, ts(2026, 1, 21, 16, 50)));
    }
}
