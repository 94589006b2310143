//! Window cutoffs. Every cutoff is an exclusive lower bound: a day is
//! recent enough when it is strictly after the cutoff.

use chrono::{Datelike, Days, NaiveDate};

use backroll_core::month_length;

/// `today` minus `days`, saturating at the earliest representable date.
pub fn days_back(today: NaiveDate, days: u64) -> NaiveDate {
    today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN)
}

/// Cutoff of a daily window of `keep_days`.
pub fn daily_cutoff(today: NaiveDate, keep_days: u32) -> NaiveDate {
    days_back(today, u64::from(keep_days))
}

/// Cutoff of a weekly window of `keep_weeks`, measured in 7-day units.
pub fn weekly_cutoff(today: NaiveDate, keep_weeks: u32) -> NaiveDate {
    days_back(today, 7 * u64::from(keep_weeks))
}

/// Cutoff of a monthly window of `keep_months`.
///
/// Steps back from `today` by the length of each of the preceding
/// calendar months, so one month before October 19 is September 19 and one
/// month before March 31 (non-leap year) is March 3.
pub fn monthly_cutoff(today: NaiveDate, keep_months: u32) -> NaiveDate {
    let mut cutoff = today;
    let mut month_start = today.with_day(1).unwrap_or(today);
    for _ in 0..keep_months {
        let Some(previous_last) = month_start.pred_opt() else {
            return NaiveDate::MIN;
        };
        cutoff = days_back(cutoff, u64::from(month_length(previous_last)));
        if cutoff == NaiveDate::MIN {
            break;
        }
        month_start = previous_last.with_day(1).unwrap_or(previous_last);
    }
    cutoff
}
