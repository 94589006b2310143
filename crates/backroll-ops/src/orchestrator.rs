//! Drives a whole retention run.

use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use backroll_core::{DayOffset, RollConfig, RollError};
use backroll_policy::RetentionPolicy;
use backroll_scan::{Filesystem, Workspace};

use crate::executor::Executor;
use crate::report::{Reporter, RollEvent, RunReport, TierReport};
use crate::store::{CleanupOutcome, RetentionStore};

/// Runs collection and cleanup for every tier, monthly first.
#[derive(Debug, Clone)]
pub struct Orchestrator {
    workspace_dir: PathBuf,
    offset: DayOffset,
    today: NaiveDate,
    stores: Vec<RetentionStore>,
    keep_old_backups: bool,
    keep_workspace: bool,
    dry_run: bool,
}

impl Orchestrator {
    /// Build the tiers enabled by `config`.
    pub fn from_config(config: &RollConfig) -> Result<Self, RollError> {
        config.validate()?;
        let today = config
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        let offset = config.offset();

        let stores = config
            .enabled_tiers()
            .into_iter()
            .map(|tier| -> Result<RetentionStore, RollError> {
                let policy = RetentionPolicy::from_config(tier, config)?;
                Ok(RetentionStore::new(config.tier_dir(tier), policy, offset).with_today(today))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            workspace_dir: config.workspace_dir.clone(),
            offset,
            today,
            stores,
            keep_old_backups: config.keep_old_backups,
            keep_workspace: config.keep_workspace,
            dry_run: config.dry_run,
        })
    }

    /// Workspace directory.
    pub fn workspace_dir(&self) -> &Path {
        &self.workspace_dir
    }

    /// Stores in processing order.
    pub fn stores(&self) -> &[RetentionStore] {
        &self.stores
    }

    /// Date windows are computed from.
    pub fn today(&self) -> NaiveDate {
        self.today
    }

    /// Run every tier. The first error aborts the run; tiers after the
    /// failing one are not processed and the workspace is left untouched.
    pub fn run(&self, fs: &dyn Filesystem, reporter: &dyn Reporter) -> Result<RunReport, RollError> {
        let workspace = Workspace::open(fs, &self.workspace_dir, self.offset)?;
        let exec = Executor::new(fs, reporter).with_dry_run(self.dry_run);
        exec.report(RollEvent::WorkspaceScanned {
            directory: self.workspace_dir.clone(),
            files: workspace.listing().len(),
            days: workspace.listing().day_count(),
        });

        let mut tiers = Vec::with_capacity(self.stores.len());
        for store in &self.stores {
            exec.report(RollEvent::TierStarted {
                tier: store.tier(),
                directory: store.directory().to_path_buf(),
                policy: store.policy().to_string(),
            });

            let collected = store.collect(&exec, &workspace)?;
            let cleaned = if self.keep_old_backups {
                CleanupOutcome::skipped()
            } else {
                store.cleanup_after(&exec, &collected)?
            };

            tiers.push(TierReport {
                tier: store.tier(),
                directory: store.directory().to_path_buf(),
                policy: store.policy().to_string(),
                collected_days: collected.days,
                copied: collected.copied,
                bytes_copied: collected.bytes,
                cleanup_days: cleaned.days,
                removed: cleaned.removed,
                cleanup_skipped: cleaned.skipped,
            });
        }

        let workspace_removed = if self.keep_workspace {
            Vec::new()
        } else {
            clean_workspace(&exec, &workspace)?
        };

        Ok(RunReport {
            reference_date: self.today,
            dry_run: self.dry_run,
            workspace: self.workspace_dir.clone(),
            workspace_files: workspace.listing().len(),
            tiers,
            workspace_removed,
        })
    }
}

/// Delete the files of the workspace snapshot. Files that appeared after the
/// snapshot was taken are left alone.
fn clean_workspace(exec: &Executor<'_>, workspace: &Workspace) -> Result<Vec<PathBuf>, RollError> {
    let mut removed = Vec::with_capacity(workspace.listing().len());
    for entry in workspace.listing().entries() {
        exec.remove(&entry.path)?;
        removed.push(entry.path.clone());
    }
    Ok(removed)
}
