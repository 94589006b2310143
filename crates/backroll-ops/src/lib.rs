//! Collection and cleanup of backroll retention tiers.
//!
//! A run snapshots the workspace once, then walks the tiers in order
//! (monthly, weekly, daily). Each [`RetentionStore`] copies the workspace
//! files of its in-window days into its directory and deletes the files
//! of days that left its window. Every side effect goes through an
//! [`Executor`], which in dry-run mode only reports what it would do.
//!
//! ```rust,no_run
//! use backroll_core::RollConfig;
//! use backroll_ops::{Orchestrator, TracingReporter};
//! use backroll_scan::LocalFs;
//!
//! let config = RollConfig::builder()
//!     .workspace_dir("/srv/backups")
//!     .dry_run(true)
//!     .build()
//!     .unwrap();
//!
//! let report = Orchestrator::from_config(&config)
//!     .unwrap()
//!     .run(&LocalFs, &TracingReporter)
//!     .unwrap();
//! println!("{} files would be copied", report.total_copied());
//! ```

mod executor;
mod orchestrator;
mod report;
mod store;

pub use executor::Executor;
pub use orchestrator::Orchestrator;
pub use report::{
    RecordingReporter, Reporter, RollEvent, RunReport, Severity, TierReport, TracingReporter,
};
pub use store::{CleanupOutcome, CollectOutcome, RetentionStore};
