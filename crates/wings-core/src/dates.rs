//! Calendar-date helpers.
//!
//! Every windowed aggregation in the crate goes through this module so the
//! trailing window is defined in one place: `[end - 6 ..= end]`, oldest first.

use chrono::{Datelike, Duration, Local, NaiveDate};

/// Length of the trailing window used by capacity and growth.
pub const WINDOW_DAYS: usize = 7;

/// Source of "today".
///
/// The engine never reads the wall clock directly so that day transitions can
/// be replayed in tests.
pub trait Clock: Send + Sync {
    /// Current calendar date.
    fn today(&self) -> NaiveDate;

    /// The calendar date before [`Clock::today`].
    fn yesterday(&self) -> NaiveDate {
        add_days(self.today(), -1)
    }
}

/// Local wall-clock calendar date.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self(date)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

/// Shift `date` by `days` (negative moves backwards).
pub fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

/// Whole days from `today` until `target`. Negative once `target` has passed.
pub fn days_remaining(today: NaiveDate, target: NaiveDate) -> i64 {
    (target - today).num_days()
}

/// Monday of the ISO week containing `date`. A Sunday maps to the Monday six
/// days earlier.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    add_days(date, -i64::from(date.weekday().num_days_from_monday()))
}

/// First day of the month containing `date`.
pub fn start_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// The seven dates ending at `end`, oldest first.
pub fn trailing_window(end: NaiveDate) -> [NaiveDate; WINDOW_DAYS] {
    let mut days = [end; WINDOW_DAYS];
    for (i, day) in days.iter_mut().enumerate() {
        *day = add_days(end, i as i64 - (WINDOW_DAYS as i64 - 1));
    }
    days
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn fixed_clock_yesterday_crosses_month() {
        let clock = FixedClock::new(d(2024, 3, 1));
        assert_eq!(clock.yesterday(), d(2024, 2, 29));
    }

    #[test]
    fn add_days_both_directions() {
        assert_eq!(add_days(d(2024, 12, 31), 1), d(2025, 1, 1));
        assert_eq!(add_days(d(2025, 1, 1), -1), d(2024, 12, 31));
        assert_eq!(add_days(d(2025, 1, 1), 90), d(2025, 4, 1));
    }

    #[test]
    fn days_remaining_counts_whole_days() {
        assert_eq!(days_remaining(d(2024, 1, 1), d(2024, 1, 31)), 30);
        assert_eq!(days_remaining(d(2024, 1, 31), d(2024, 1, 31)), 0);
        assert_eq!(days_remaining(d(2024, 2, 2), d(2024, 1, 31)), -2);
    }

    #[test]
    fn start_of_week_is_monday_anchored() {
        // 2024-06-12 is a Wednesday.
        assert_eq!(start_of_week(d(2024, 6, 12)), d(2024, 6, 10));
        assert_eq!(start_of_week(d(2024, 6, 10)), d(2024, 6, 10));
        // Sunday belongs to the week that started six days earlier.
        assert_eq!(d(2024, 6, 16).weekday(), Weekday::Sun);
        assert_eq!(start_of_week(d(2024, 6, 16)), d(2024, 6, 10));
    }

    #[test]
    fn trailing_window_is_oldest_first_and_inclusive() {
        let window = trailing_window(d(2024, 6, 7));
        assert_eq!(window[0], d(2024, 6, 1));
        assert_eq!(window[6], d(2024, 6, 7));
        assert!(window.windows(2).all(|w| add_days(w[0], 1) == w[1]));
    }

    #[test]
    fn start_of_month() {
        assert_eq!(super::start_of_month(d(2024, 6, 17)), d(2024, 6, 1));
    }
}
