//! Retention stores: one directory per tier.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use backroll_core::{DayBucketer, DayOffset, FileEntry, Listing, RollError, StorageOperation, Tier};
use backroll_policy::RetentionPolicy;
use backroll_scan::{Filesystem, Workspace, scan_listing};

use crate::executor::Executor;
use crate::report::RollEvent;

/// Result of [`RetentionStore::collect`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectOutcome {
    /// Workspace days selected for collection.
    pub days: Vec<NaiveDate>,
    /// Destination paths written (or that would be written).
    pub copied: Vec<PathBuf>,
    /// Bytes copied.
    pub bytes: u64,
    /// Store entries as they look after the copies: destination paths with
    /// the source times.
    pub written: Vec<FileEntry>,
}

/// Result of [`RetentionStore::cleanup`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanupOutcome {
    /// Store days selected for cleanup.
    pub days: Vec<NaiveDate>,
    /// Files removed (or that would be removed).
    pub removed: Vec<PathBuf>,
    /// The store directory did not exist.
    pub skipped: bool,
}

impl CleanupOutcome {
    /// Outcome of a cleanup that did not run.
    pub fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// A tier directory governed by a retention policy.
#[derive(Debug, Clone)]
pub struct RetentionStore {
    directory: PathBuf,
    policy: RetentionPolicy,
    offset: DayOffset,
    today: NaiveDate,
}

impl RetentionStore {
    /// Create a store evaluated against today's local date.
    pub fn new(directory: impl Into<PathBuf>, policy: RetentionPolicy, offset: DayOffset) -> Self {
        Self {
            directory: directory.into(),
            policy,
            offset,
            today: Local::now().date_naive(),
        }
    }

    /// Evaluate windows against `today` instead of the current date.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Tier of the store's policy.
    pub fn tier(&self) -> Tier {
        self.policy.tier()
    }

    /// Store directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Retention policy.
    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Date windows are computed from.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Snapshot the store's files, or `None` if the directory is missing.
    pub fn snapshot(&self, fs: &dyn Filesystem) -> Result<Option<Listing>, RollError> {
        if !fs.directory_exists(&self.directory) {
            return Ok(None);
        }
        scan_listing(fs, &self.directory, self.offset)
            .map(Some)
            .map_err(|e| RollError::storage(StorageOperation::List, &self.directory, e))
    }

    /// Copy the workspace files of every in-window day into the store.
    ///
    /// The store directory is created if needed; its parent must exist.
    /// Files already present under the same name are overwritten.
    pub fn collect(
        &self,
        exec: &Executor<'_>,
        workspace: &Workspace,
    ) -> Result<CollectOutcome, RollError> {
        exec.ensure_directory(&self.directory)?;
        if self.policy.is_disabled() {
            exec.report(RollEvent::CollectionDisabled { tier: self.tier() });
        }

        let days = self
            .policy
            .filter_for_collect(&workspace.all_days(), self.today);
        exec.report(RollEvent::DaysSelected {
            tier: self.tier(),
            cleanup: false,
            days: days.iter().copied().collect(),
        });

        let mut outcome = CollectOutcome {
            days: days.iter().copied().collect(),
            ..CollectOutcome::default()
        };
        for day in days {
            for entry in workspace.list(day) {
                let Some(name) = entry.file_name() else {
                    continue;
                };
                let destination = self.directory.join(name);
                outcome.bytes += exec.copy_preserving_times(entry, &destination)?;
                outcome.written.push(FileEntry::file(
                    &destination,
                    entry.modified,
                    entry.accessed,
                    entry.len,
                ));
                outcome.copied.push(destination);
            }
        }
        Ok(outcome)
    }

    /// Delete the store files of every day that left the window.
    ///
    /// A missing store directory is not an error. The first failed deletion
    /// aborts the cleanup.
    pub fn cleanup(&self, exec: &Executor<'_>) -> Result<CleanupOutcome, RollError> {
        match self.snapshot(exec.fs())? {
            Some(listing) => self.remove_aged_out(exec, &listing),
            None => Ok(self.skip_cleanup(exec)),
        }
    }

    /// Clean up after `collected`, the outcome of [`collect`](Self::collect)
    /// on this store.
    ///
    /// In a dry run the store was left untouched, so the snapshot is
    /// overlaid with the copies the collection would have made, and a
    /// missing directory counts as the empty one `collect` would create.
    pub fn cleanup_after(
        &self,
        exec: &Executor<'_>,
        collected: &CollectOutcome,
    ) -> Result<CleanupOutcome, RollError> {
        if !exec.is_dry_run() {
            return self.cleanup(exec);
        }

        let snapshot = self.snapshot(exec.fs())?.unwrap_or_default();
        let listing = overlay(snapshot, &collected.written, self.offset);
        self.remove_aged_out(exec, &listing)
    }

    fn skip_cleanup(&self, exec: &Executor<'_>) -> CleanupOutcome {
        exec.report(RollEvent::CleanupSkipped {
            tier: self.tier(),
            directory: self.directory.clone(),
        });
        CleanupOutcome::skipped()
    }

    fn remove_aged_out(
        &self,
        exec: &Executor<'_>,
        listing: &Listing,
    ) -> Result<CleanupOutcome, RollError> {
        let days = self
            .policy
            .filter_for_cleanup(&listing.all_days(), self.today);
        exec.report(RollEvent::DaysSelected {
            tier: self.tier(),
            cleanup: true,
            days: days.iter().copied().collect(),
        });

        let mut outcome = CleanupOutcome {
            days: days.iter().copied().collect(),
            ..CleanupOutcome::default()
        };
        for day in days {
            for entry in listing.list(day) {
                exec.remove(&entry.path)?;
                outcome.removed.push(entry.path.clone());
            }
        }
        Ok(outcome)
    }
}

/// `listing` with `written` applied on top. A written entry replaces the
/// listed file of the same name.
fn overlay(listing: Listing, written: &[FileEntry], offset: DayOffset) -> Listing {
    let mut by_name: BTreeMap<OsString, FileEntry> = listing
        .entries()
        .filter_map(|e| Some((e.file_name()?.to_os_string(), e.clone())))
        .collect();
    for entry in written {
        if let Some(name) = entry.file_name() {
            by_name.insert(name.to_os_string(), entry.clone());
        }
    }
    DayBucketer::new(offset).bucket(by_name.into_values())
}
