//! Filesystem access and directory snapshots for backroll.
//!
//! The retention engine talks to the disk only through the [`Filesystem`]
//! trait. [`LocalFs`] is the standard implementation.
//!
//! A [`Workspace`] is an immutable snapshot: its files are listed and
//! grouped by day once, when it is opened.
//!
//! ```rust,no_run
//! use backroll_scan::{DayOffset, LocalFs, Workspace};
//!
//! let workspace = Workspace::open(&LocalFs, "/srv/backups", DayOffset::hours(6)).unwrap();
//! for day in workspace.all_days() {
//!     println!("{day}: {} files", workspace.list(day).len());
//! }
//! ```

mod directory;
mod fs;

pub use directory::{Workspace, scan_listing};
pub use fs::{Filesystem, LocalFs};

// Re-export core types for convenience
pub use backroll_core::{DayOffset, EntryKind, FileEntry, Listing};
