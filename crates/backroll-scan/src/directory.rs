//! Directory snapshots.

use std::collections::BTreeSet;
use std::io;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use backroll_core::{DayBucketer, DayOffset, FileEntry, Listing, RollError};

use crate::fs::Filesystem;

/// List `dir` through `fs` and group its files by day.
pub fn scan_listing(fs: &dyn Filesystem, dir: &Path, offset: DayOffset) -> io::Result<Listing> {
    let entries = fs.list_directory(dir)?;
    let listing = DayBucketer::new(offset).bucket(entries);
    tracing::debug!(
        dir = %dir.display(),
        files = listing.len(),
        days = listing.day_count(),
        "Scanned directory"
    );
    Ok(listing)
}

/// The directory backups are collected from, with a listing taken once at
/// [`open`](Self::open) and shared read-only by every tier.
#[derive(Debug, Clone)]
pub struct Workspace {
    directory: PathBuf,
    offset: DayOffset,
    listing: Listing,
}

impl Workspace {
    /// Snapshot the workspace directory.
    pub fn open(
        fs: &dyn Filesystem,
        directory: impl Into<PathBuf>,
        offset: DayOffset,
    ) -> Result<Self, RollError> {
        let directory = directory.into();
        let listing =
            scan_listing(fs, &directory, offset).map_err(|e| RollError::access(&directory, e))?;
        Ok(Self {
            directory,
            offset,
            listing,
        })
    }

    /// Create a workspace from an existing listing.
    pub fn from_listing(directory: impl Into<PathBuf>, offset: DayOffset, listing: Listing) -> Self {
        Self {
            directory: directory.into(),
            offset,
            listing,
        }
    }

    /// Workspace directory.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Day offset used for the snapshot.
    pub fn offset(&self) -> DayOffset {
        self.offset
    }

    /// The snapshot.
    pub fn listing(&self) -> &Listing {
        &self.listing
    }

    /// Days with at least one workspace file.
    pub fn all_days(&self) -> BTreeSet<NaiveDate> {
        self.listing.all_days()
    }

    /// Workspace files attributed to `day`.
    pub fn list(&self, day: NaiveDate) -> &[FileEntry] {
        self.listing.list(day)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::LocalFs;
    use chrono::{Local, NaiveDateTime, TimeZone};
    use std::fs;
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn at(s: &str) -> SystemTime {
        let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
        Local.from_local_datetime(&naive).earliest().unwrap().into()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn touch(path: &Path, modified: &str) {
        fs::write(path, "test").unwrap();
        LocalFs.set_times(path, SystemTime::now(), at(modified)).unwrap();
    }

    fn dir(path: &Path, modified: &str) {
        fs::create_dir(path).unwrap();
        LocalFs.set_times(path, SystemTime::now(), at(modified)).ok();
    }

    #[test]
    fn test_empty_workspace() {
        let temp = TempDir::new().unwrap();
        let workspace = Workspace::open(&LocalFs, temp.path(), DayOffset::default()).unwrap();

        assert!(workspace.all_days().is_empty());
        assert!(workspace.list(date(2000, 12, 30)).is_empty());
    }

    #[test]
    fn test_directories_dont_count() {
        let temp = TempDir::new().unwrap();
        dir(&temp.path().join("test"), "2000-12-31 00:00:00");

        let workspace = Workspace::open(&LocalFs, temp.path(), DayOffset::default()).unwrap();
        assert!(workspace.all_days().is_empty());
    }

    #[test]
    fn test_nested_files_dont_count() {
        let temp = TempDir::new().unwrap();
        let nested = temp.path().join("testdir");
        fs::create_dir(&nested).unwrap();
        touch(&nested.join("testfile"), "2000-12-31 00:00:00");

        let workspace = Workspace::open(&LocalFs, temp.path(), DayOffset::default()).unwrap();
        assert!(workspace.all_days().is_empty());
    }

    #[test]
    fn test_list_excludes_dirs() {
        let temp = TempDir::new().unwrap();
        dir(&temp.path().join("testdir"), "2000-12-31 00:00:00");
        touch(&temp.path().join("testfile"), "2000-12-31 00:00:00");

        let workspace = Workspace::open(&LocalFs, temp.path(), DayOffset::default()).unwrap();
        let listed = workspace.list(date(2000, 12, 31));

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].path, temp.path().join("testfile"));
    }

    #[test]
    fn test_list_uses_offset() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("first"), "2000-12-30 23:00:00");
        touch(&temp.path().join("last"), "2000-12-31 22:59:59");
        touch(&temp.path().join("next"), "2000-12-31 23:00:00");

        let workspace = Workspace::open(&LocalFs, temp.path(), DayOffset::hours(1)).unwrap();
        let listed: Vec<_> = workspace
            .list(date(2000, 12, 31))
            .iter()
            .map(|e| e.path.clone())
            .collect();

        assert_eq!(
            listed,
            vec![temp.path().join("first"), temp.path().join("last")]
        );
        assert_eq!(workspace.all_days().len(), 2);
    }

    #[test]
    fn test_snapshot_is_not_refreshed() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("first"), "2000-12-31 12:00:00");

        let workspace = Workspace::open(&LocalFs, temp.path(), DayOffset::default()).unwrap();
        touch(&temp.path().join("second"), "2000-12-30 12:00:00");

        assert_eq!(workspace.all_days().len(), 1);
        let reopened = Workspace::open(&LocalFs, temp.path(), DayOffset::default()).unwrap();
        assert_eq!(reopened.all_days().len(), 2);
    }

    #[test]
    fn test_missing_workspace_is_access_error() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("missing");

        let err = Workspace::open(&LocalFs, &missing, DayOffset::default()).unwrap_err();
        assert!(matches!(err, RollError::FilesystemAccess { ref path, .. } if *path == missing));
    }
}
