//! Calendar-day helpers.

use std::time::SystemTime;

use chrono::{DateTime, Datelike, Local, NaiveDate, TimeDelta};
use serde::{Deserialize, Serialize};

/// Hour shift applied to modification times before deriving the day.
///
/// A positive offset moves late-evening files onto the following day, so a
/// backup started at 23:00 and one finished at 00:10 share a day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DayOffset(pub i32);

impl DayOffset {
    /// Create an offset of whole hours.
    pub fn hours(hours: i32) -> Self {
        Self(hours)
    }

    /// Calendar day of `time` in local wall-clock time, shifted by this offset.
    pub fn day_of(self, time: SystemTime) -> NaiveDate {
        let local = DateTime::<Local>::from(time).naive_local();
        local
            .checked_add_signed(TimeDelta::hours(i64::from(self.0)))
            .unwrap_or(local)
            .date()
    }
}

impl From<i32> for DayOffset {
    fn from(hours: i32) -> Self {
        Self(hours)
    }
}

/// Number of days in the month of `day`.
pub fn month_length(day: NaiveDate) -> u32 {
    let (year, month) = if day.month() == 12 {
        (day.year() + 1, 1)
    } else {
        (day.year(), day.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|first| first.pred_opt())
        .map_or(31, |last| last.day())
}
