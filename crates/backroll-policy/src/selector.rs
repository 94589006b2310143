//! Day selectors: which weekdays and month days a tier keeps.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, Weekday};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use backroll_core::{RollError, month_length};

/// Set of weekdays, 0 = Monday .. 6 = Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Weekdays(BTreeSet<u32>);

impl Weekdays {
    /// Create a set from 0-based indices (0 = Monday).
    pub fn new(days: impl IntoIterator<Item = u32>) -> Result<Self, RollError> {
        let days: BTreeSet<u32> = days.into_iter().collect();
        if let Some(day) = days.iter().find(|d| **d > 6) {
            return Err(RollError::config(format!(
                "weekday {day} is out of range 0..=6"
            )));
        }
        Ok(Self(days))
    }

    /// Create a set from ISO numbers (1 = Monday .. 7 = Sunday).
    pub fn from_iso(days: impl IntoIterator<Item = u32>) -> Result<Self, RollError> {
        let days: BTreeSet<u32> = days.into_iter().collect();
        if let Some(day) = days.iter().find(|d| !(1..=7).contains(*d)) {
            return Err(RollError::config(format!(
                "weekday {day} is out of range 1..=7"
            )));
        }
        Ok(Self(days.into_iter().map(|d| d - 1).collect()))
    }

    /// Every day of the week.
    pub fn all() -> Self {
        Self((0..7).collect())
    }

    /// Check if `weekday` is selected.
    pub fn contains(&self, weekday: Weekday) -> bool {
        self.0.contains(&weekday.num_days_from_monday())
    }

    /// Check if `day` falls on a selected weekday.
    pub fn matches(&self, day: NaiveDate) -> bool {
        self.contains(day.weekday())
    }

    /// Check if no weekday is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected 0-based indices, ascending.
    pub fn iter(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for Weekdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = self
            .0
            .iter()
            .filter_map(|d| Weekday::try_from(*d as u8).ok())
            .join(",");
        write!(f, "{names}")
    }
}

/// Set of month days. Positive values are days of the month (1-based);
/// negative values count from the end, so -1 is the last day of any month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Monthdays(BTreeSet<i32>);

impl Monthdays {
    /// Create a set of month days. Zero and values beyond 31 are rejected.
    pub fn new(days: impl IntoIterator<Item = i32>) -> Result<Self, RollError> {
        let days: BTreeSet<i32> = days.into_iter().collect();
        if let Some(day) = days.iter().find(|d| **d == 0 || !(-31..=31).contains(*d)) {
            return Err(RollError::config(format!(
                "month day {day} must be within 1..=31 or -31..=-1"
            )));
        }
        Ok(Self(days))
    }

    /// Every positive day of the month.
    pub fn all() -> Self {
        Self((1..=31).collect())
    }

    /// Check if `day` is selected, either by its day number or by its
    /// distance from the end of its month.
    pub fn matches(&self, day: NaiveDate) -> bool {
        let number = day.day() as i32;
        let from_end = number - month_length(day) as i32 - 1;
        self.0.contains(&number) || self.0.contains(&from_end)
    }

    /// Check if no month day is selected.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Selected values, ascending.
    pub fn iter(&self) -> impl Iterator<Item = i32> + '_ {
        self.0.iter().copied()
    }
}

impl fmt::Display for Monthdays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join(","))
    }
}
