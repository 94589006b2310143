//! Retention windows for backroll.
//!
//! Each tier keeps a set of calendar days:
//!
//! - **Daily** keeps every day strictly after `today - keep_days`
//! - **Weekly** keeps selected weekdays strictly after `today - 7 * keep_weeks`
//! - **Monthly** keeps selected month days within the last `keep_months`
//!   calendar months; negative month days count from the end of the month
//!
//! Collection and cleanup are exact complements over the same set of days:
//!
//! ```rust
//! use std::collections::BTreeSet;
//!
//! use backroll_policy::{Monthdays, RetentionPolicy};
//! use chrono::NaiveDate;
//!
//! let today = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
//! let days: BTreeSet<NaiveDate> = [
//!     NaiveDate::from_ymd_opt(2021, 2, 28).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 3, 1).unwrap(),
//!     NaiveDate::from_ymd_opt(2021, 3, 2).unwrap(),
//! ]
//! .into_iter()
//! .collect();
//!
//! let policy = RetentionPolicy::monthly(1, Monthdays::new([1, -1]).unwrap());
//! let keep = policy.filter_for_collect(&days, today);
//! let drop = policy.filter_for_cleanup(&days, today);
//!
//! assert_eq!(keep.len(), 2);
//! assert_eq!(drop.into_iter().collect::<Vec<_>>(), vec![NaiveDate::from_ymd_opt(2021, 3, 2).unwrap()]);
//! ```

mod policy;
mod selector;
pub mod window;

pub use policy::RetentionPolicy;
pub use selector::{Monthdays, Weekdays};
