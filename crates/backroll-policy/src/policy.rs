//! Retention policies for the three tiers.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use backroll_core::{RollConfig, RollError, Tier};

use crate::selector::{Monthdays, Weekdays};
use crate::window::{daily_cutoff, monthly_cutoff, weekly_cutoff};

/// Decides which calendar days a tier keeps.
///
/// A day is in window when it is strictly after the tier's cutoff and
/// passes the tier's day selector. Collection copies in-window days;
/// cleanup removes the complement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetentionPolicy {
    /// Keep every day of the last `keep_days` days.
    Daily { keep_days: u32 },
    /// Keep selected weekdays of the last `keep_weeks` weeks.
    Weekly { keep_weeks: u32, weekdays: Weekdays },
    /// Keep selected month days of the last `keep_months` months.
    Monthly { keep_months: u32, monthdays: Monthdays },
}

impl RetentionPolicy {
    /// Create a daily policy.
    pub fn daily(keep_days: u32) -> Self {
        Self::Daily { keep_days }
    }

    /// Create a weekly policy.
    pub fn weekly(keep_weeks: u32, weekdays: Weekdays) -> Self {
        Self::Weekly {
            keep_weeks,
            weekdays,
        }
    }

    /// Create a monthly policy.
    pub fn monthly(keep_months: u32, monthdays: Monthdays) -> Self {
        Self::Monthly {
            keep_months,
            monthdays,
        }
    }

    /// Build the policy of `tier` from a run configuration.
    pub fn from_config(tier: Tier, config: &RollConfig) -> Result<Self, RollError> {
        Ok(match tier {
            Tier::Daily => Self::daily(config.daily_retention),
            Tier::Weekly => Self::weekly(
                config.weekly_retention,
                Weekdays::new(config.weekdays.iter().copied())?,
            ),
            Tier::Monthly => Self::monthly(
                config.monthly_retention,
                Monthdays::new(config.monthdays.iter().copied())?,
            ),
        })
    }

    /// Tier this policy belongs to.
    pub fn tier(&self) -> Tier {
        match self {
            Self::Daily { .. } => Tier::Daily,
            Self::Weekly { .. } => Tier::Weekly,
            Self::Monthly { .. } => Tier::Monthly,
        }
    }

    /// Exclusive lower bound of the window, or `None` if nothing is kept.
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Daily { keep_days: 0 }
            | Self::Weekly { keep_weeks: 0, .. }
            | Self::Monthly { keep_months: 0, .. } => None,
            Self::Daily { keep_days } => Some(daily_cutoff(today, *keep_days)),
            Self::Weekly { keep_weeks, .. } => Some(weekly_cutoff(today, *keep_weeks)),
            Self::Monthly { keep_months, .. } => Some(monthly_cutoff(today, *keep_months)),
        }
    }

    /// Check the day selector alone, ignoring recency.
    pub fn selects(&self, day: NaiveDate) -> bool {
        match self {
            Self::Daily { .. } => true,
            Self::Weekly { weekdays, .. } => weekdays.matches(day),
            Self::Monthly { monthdays, .. } => monthdays.matches(day),
        }
    }

    /// Check if `day` is kept by this policy.
    pub fn is_in_window(&self, day: NaiveDate, today: NaiveDate) -> bool {
        self.cutoff(today)
            .is_some_and(|cutoff| day > cutoff && self.selects(day))
    }

    /// Days that should be copied into (or kept in) the tier.
    pub fn filter_for_collect(
        &self,
        days: &BTreeSet<NaiveDate>,
        today: NaiveDate,
    ) -> BTreeSet<NaiveDate> {
        let cutoff = self.cutoff(today);
        tracing::debug!(tier = %self.tier(), %today, ?cutoff, "Filtering days for collection");
        let Some(cutoff) = cutoff else {
            return BTreeSet::new();
        };
        days.iter()
            .filter(|day| **day > cutoff && self.selects(**day))
            .copied()
            .collect()
    }

    /// Days that have aged out of the tier: the complement of
    /// [`filter_for_collect`](Self::filter_for_collect) over the same input.
    pub fn filter_for_cleanup(
        &self,
        days: &BTreeSet<NaiveDate>,
        today: NaiveDate,
    ) -> BTreeSet<NaiveDate> {
        let keep = self.filter_for_collect(days, today);
        days.difference(&keep).copied().collect()
    }

    /// Check if the selector excludes every day.
    pub fn is_disabled(&self) -> bool {
        match self {
            Self::Daily { .. } => false,
            Self::Weekly { weekdays, .. } => weekdays.is_empty(),
            Self::Monthly { monthdays, .. } => monthdays.is_empty(),
        }
    }
}

impl fmt::Display for RetentionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Daily { keep_days } => write!(f, "daily, keep {keep_days} days"),
            Self::Weekly {
                keep_weeks,
                weekdays,
            } => write!(f, "weekly on [{weekdays}], keep {keep_weeks} weeks"),
            Self::Monthly {
                keep_months,
                monthdays,
            } => write!(f, "monthly on days [{monthdays}], keep {keep_months} months"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_daily_boundary_excluded() {
        let today = date(2026, 10, 19);
        let policy = RetentionPolicy::daily(1);

        assert!(policy.is_in_window(today, today));
        assert!(!policy.is_in_window(date(2026, 10, 18), today));
    }

    #[test]
    fn test_zero_keep_collects_nothing() {
        let today = date(2026, 10, 19);
        let days: BTreeSet<_> = [today, date(2026, 10, 20)].into_iter().collect();

        for policy in [
            RetentionPolicy::daily(0),
            RetentionPolicy::weekly(0, Weekdays::all()),
            RetentionPolicy::monthly(0, Monthdays::all()),
        ] {
            assert!(policy.filter_for_collect(&days, today).is_empty());
            assert_eq!(policy.filter_for_cleanup(&days, today), days);
        }
    }

    #[test]
    fn test_future_days_are_kept() {
        let today = date(2026, 10, 19);
        assert!(RetentionPolicy::daily(1).is_in_window(date(2026, 10, 25), today));
    }

    #[test]
    fn test_from_config() {
        let config = RollConfig::new("/srv/backups");
        let weekly = RetentionPolicy::from_config(Tier::Weekly, &config).unwrap();

        assert_eq!(weekly.tier(), Tier::Weekly);
        assert!(weekly.selects(date(2026, 10, 18)));
        assert!(!weekly.selects(date(2026, 10, 19)));
        assert_eq!(weekly.to_string(), "weekly on [Sun], keep 12 weeks");
    }

    #[test]
    fn test_disabled_selector() {
        let policy = RetentionPolicy::weekly(4, Weekdays::default());
        assert!(policy.is_disabled());
        assert!(!RetentionPolicy::daily(0).is_disabled());
    }
}
