//! Run events, reporters and run summaries.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use strum::Display;

use backroll_core::Tier;

/// Severity of a [`RollEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Debug,
    Info,
    Warn,
}

/// Something that happened (or would happen, in a dry run) during a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RollEvent {
    /// The workspace snapshot was taken.
    WorkspaceScanned {
        directory: PathBuf,
        files: usize,
        days: usize,
    },
    /// A tier is about to be processed.
    TierStarted {
        tier: Tier,
        directory: PathBuf,
        policy: String,
    },
    /// Days selected for collection or cleanup.
    DaysSelected {
        tier: Tier,
        cleanup: bool,
        days: Vec<NaiveDate>,
    },
    /// A store directory was created.
    DirectoryCreated { path: PathBuf, dry_run: bool },
    /// A file was copied into a store.
    FileCopied {
        source: PathBuf,
        destination: PathBuf,
        bytes: u64,
        dry_run: bool,
    },
    /// A file was removed from a store or the workspace.
    FileRemoved { path: PathBuf, dry_run: bool },
    /// Cleanup found no store directory.
    CleanupSkipped { tier: Tier, directory: PathBuf },
    /// The tier's day selector is empty, so it never collects anything.
    CollectionDisabled { tier: Tier },
}

impl RollEvent {
    /// How important the event is.
    pub fn severity(&self) -> Severity {
        match self {
            Self::WorkspaceScanned { .. }
            | Self::DaysSelected { .. }
            | Self::CleanupSkipped { .. } => Severity::Debug,
            Self::TierStarted { .. }
            | Self::DirectoryCreated { .. }
            | Self::FileCopied { .. }
            | Self::FileRemoved { .. } => Severity::Info,
            Self::CollectionDisabled { .. } => Severity::Warn,
        }
    }
}

impl fmt::Display for RollEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WorkspaceScanned {
                directory,
                files,
                days,
            } => write!(
                f,
                "Workspace {} holds {files} files over {days} days",
                directory.display()
            ),
            Self::TierStarted {
                tier,
                directory,
                policy,
            } => write!(f, "Processing {tier} tier at {} ({policy})", directory.display()),
            Self::DaysSelected {
                tier,
                cleanup,
                days,
            } => {
                let phase = if *cleanup { "cleanup" } else { "collection" };
                write!(f, "{} days selected for {tier} {phase}", days.len())
            }
            Self::DirectoryCreated { path, dry_run } => {
                let verb = if *dry_run { "Would create" } else { "Created" };
                write!(f, "{verb} directory {}", path.display())
            }
            Self::FileCopied {
                source,
                destination,
                dry_run,
                ..
            } => {
                let verb = if *dry_run { "Would copy" } else { "Copying" };
                write!(f, "{verb} {} -> {}", source.display(), destination.display())
            }
            Self::FileRemoved { path, dry_run } => {
                let verb = if *dry_run { "Would delete" } else { "Deleting" };
                write!(f, "{verb} {}", path.display())
            }
            Self::CleanupSkipped { tier, directory } => write!(
                f,
                "No {tier} directory at {}, nothing to clean up",
                directory.display()
            ),
            Self::CollectionDisabled { tier } => {
                write!(f, "The {tier} tier selects no days; nothing will be collected")
            }
        }
    }
}

/// Receives run events.
pub trait Reporter {
    /// Handle one event.
    fn report(&self, event: &RollEvent);
}

/// Forwards events to `tracing` at the level matching their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn report(&self, event: &RollEvent) {
        match event.severity() {
            Severity::Debug => tracing::debug!(target: "backroll", "{event}"),
            Severity::Info => tracing::info!(target: "backroll", "{event}"),
            Severity::Warn => tracing::warn!(target: "backroll", "{event}"),
        }
    }
}

/// Keeps every event in memory.
#[derive(Debug, Default)]
pub struct RecordingReporter {
    events: RefCell<Vec<RollEvent>>,
}

impl RecordingReporter {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Events recorded so far.
    pub fn events(&self) -> Vec<RollEvent> {
        self.events.borrow().clone()
    }

    /// Events at or above `severity`.
    pub fn at_least(&self, severity: Severity) -> Vec<RollEvent> {
        self.events
            .borrow()
            .iter()
            .filter(|e| e.severity() >= severity)
            .cloned()
            .collect()
    }
}

impl Reporter for RecordingReporter {
    fn report(&self, event: &RollEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

/// Summary of one tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TierReport {
    /// Tier name.
    pub tier: Tier,
    /// Store directory.
    pub directory: PathBuf,
    /// Human-readable policy.
    pub policy: String,
    /// Workspace days selected for collection.
    pub collected_days: Vec<NaiveDate>,
    /// Destination paths written.
    pub copied: Vec<PathBuf>,
    /// Bytes copied.
    pub bytes_copied: u64,
    /// Store days selected for cleanup.
    pub cleanup_days: Vec<NaiveDate>,
    /// Store files removed.
    pub removed: Vec<PathBuf>,
    /// Cleanup did not run (disabled or no store directory).
    pub cleanup_skipped: bool,
}

/// Summary of a whole run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// Date the windows were computed from.
    pub reference_date: NaiveDate,
    /// Whether side effects were suppressed.
    pub dry_run: bool,
    /// Workspace directory.
    pub workspace: PathBuf,
    /// Files in the workspace snapshot.
    pub workspace_files: usize,
    /// Per-tier results, in processing order.
    pub tiers: Vec<TierReport>,
    /// Workspace files removed after collection.
    pub workspace_removed: Vec<PathBuf>,
}

impl RunReport {
    /// Total files copied over all tiers.
    pub fn total_copied(&self) -> usize {
        self.tiers.iter().map(|t| t.copied.len()).sum()
    }

    /// Total bytes copied over all tiers.
    pub fn total_bytes_copied(&self) -> u64 {
        self.tiers.iter().map(|t| t.bytes_copied).sum()
    }

    /// Total files removed from stores and the workspace.
    pub fn total_removed(&self) -> usize {
        self.tiers.iter().map(|t| t.removed.len()).sum::<usize>() + self.workspace_removed.len()
    }

    /// Report of a tier, if it was processed.
    pub fn tier(&self, tier: Tier) -> Option<&TierReport> {
        self.tiers.iter().find(|t| t.tier == tier)
    }
}
