//! Core types for backroll.
//!
//! This crate provides the data structures shared by the other backroll
//! crates: calendar-day helpers, directory entries, day listings,
//! retention tiers, run configuration and the error type.

mod config;
mod day;
mod entry;
mod error;
mod listing;
mod tier;

pub use config::{RollConfig, RollConfigBuilder, retention_count};
pub use day::{DayOffset, month_length};
pub use entry::{EntryKind, FileEntry};
pub use error::{RollError, StorageOperation};
pub use listing::{DayBucketer, Listing};
pub use tier::Tier;

/// A calendar day, in local time.
pub type Day = chrono::NaiveDate;
