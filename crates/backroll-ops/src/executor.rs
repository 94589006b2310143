//! Side effects of a run, with dry-run support.

use std::path::Path;

use backroll_core::{FileEntry, RollError, StorageOperation};
use backroll_scan::Filesystem;

use crate::report::{Reporter, RollEvent};

/// Performs (or, in a dry run, only reports) the mutating filesystem calls
/// of a run. Every mutation is reported before it is attempted.
pub struct Executor<'a> {
    fs: &'a dyn Filesystem,
    reporter: &'a dyn Reporter,
    dry_run: bool,
}

impl<'a> Executor<'a> {
    /// Create an executor that applies changes.
    pub fn new(fs: &'a dyn Filesystem, reporter: &'a dyn Reporter) -> Self {
        Self {
            fs,
            reporter,
            dry_run: false,
        }
    }

    /// Switch dry-run mode on or off.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check if mutations are suppressed.
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Filesystem used for reads and writes.
    pub fn fs(&self) -> &'a dyn Filesystem {
        self.fs
    }

    /// Forward an event to the reporter.
    pub fn report(&self, event: RollEvent) {
        self.reporter.report(&event);
    }

    /// Create `dir` if it is not a directory yet.
    pub fn ensure_directory(&self, dir: &Path) -> Result<(), RollError> {
        if self.dry_run {
            if !self.fs.directory_exists(dir) {
                self.report(RollEvent::DirectoryCreated {
                    path: dir.to_path_buf(),
                    dry_run: true,
                });
            }
            return Ok(());
        }

        let created = self
            .fs
            .make_directory_if_absent(dir)
            .map_err(|e| RollError::storage(StorageOperation::CreateDirectory, dir, e))?;
        if created {
            self.report(RollEvent::DirectoryCreated {
                path: dir.to_path_buf(),
                dry_run: false,
            });
        }
        Ok(())
    }

    /// Copy `source` to `destination`, overwriting it, then give the copy the
    /// source's access and modification times. Returns the bytes copied.
    pub fn copy_preserving_times(
        &self,
        source: &FileEntry,
        destination: &Path,
    ) -> Result<u64, RollError> {
        self.report(RollEvent::FileCopied {
            source: source.path.clone(),
            destination: destination.to_path_buf(),
            bytes: source.len,
            dry_run: self.dry_run,
        });
        if self.dry_run {
            return Ok(source.len);
        }

        let bytes = self
            .fs
            .copy_file(&source.path, destination)
            .map_err(|e| RollError::storage(StorageOperation::Copy, destination, e))?;
        self.fs
            .set_times(destination, source.accessed, source.modified)
            .map_err(|e| RollError::storage(StorageOperation::SetTimes, destination, e))?;
        Ok(bytes)
    }

    /// Remove one file.
    pub fn remove(&self, path: &Path) -> Result<(), RollError> {
        self.report(RollEvent::FileRemoved {
            path: path.to_path_buf(),
            dry_run: self.dry_run,
        });
        if self.dry_run {
            return Ok(());
        }
        self.fs
            .remove_file(path)
            .map_err(|e| RollError::storage(StorageOperation::Remove, path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::RecordingReporter;
    use backroll_scan::LocalFs;
    use std::fs;
    use std::time::{Duration, SystemTime, UNIX_EPOCH};
    use tempfile::TempDir;

    #[test]
    fn test_dry_run_touches_nothing() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("db.sql");
        fs::write(&src, "dump").unwrap();
        let now = SystemTime::now();
        let entry = FileEntry::file(&src, now, now, 4);

        let reporter = RecordingReporter::new();
        let exec = Executor::new(&LocalFs, &reporter).with_dry_run(true);
        let store = temp.path().join("daily");

        exec.ensure_directory(&store).unwrap();
        assert_eq!(exec.copy_preserving_times(&entry, &store.join("db.sql")).unwrap(), 4);
        exec.remove(&src).unwrap();

        assert!(!store.exists());
        assert!(src.exists());
        assert_eq!(reporter.events().len(), 3);
    }

    #[test]
    fn test_copy_overwrites_and_keeps_mtime() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("db.sql");
        let dst = temp.path().join("copy.sql");
        fs::write(&src, "new dump").unwrap();
        fs::write(&dst, "old").unwrap();

        let modified = UNIX_EPOCH + Duration::from_secs(1_000_000_000);
        let entry = FileEntry::file(&src, modified, modified, 8);
        let reporter = RecordingReporter::new();
        let exec = Executor::new(&LocalFs, &reporter);

        assert_eq!(exec.copy_preserving_times(&entry, &dst).unwrap(), 8);
        assert_eq!(fs::read_to_string(&dst).unwrap(), "new dump");
        assert_eq!(fs::metadata(&dst).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_remove_missing_file_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let reporter = RecordingReporter::new();
        let exec = Executor::new(&LocalFs, &reporter);

        let err = exec.remove(&temp.path().join("gone")).unwrap_err();
        assert!(matches!(
            err,
            RollError::Storage {
                operation: StorageOperation::Remove,
                ..
            }
        ));
    }
}
