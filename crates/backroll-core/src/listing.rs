//! Day listings: directory entries grouped by calendar day.

use std::collections::{BTreeMap, BTreeSet};
use std::time::SystemTime;

use chrono::NaiveDate;

use crate::day::DayOffset;
use crate::entry::FileEntry;

/// Groups directory entries by the (offset) calendar day of their
/// modification time.
#[derive(Debug, Clone, Copy, Default)]
pub struct DayBucketer {
    offset: DayOffset,
}

impl DayBucketer {
    /// Create a bucketer with the given day offset.
    pub fn new(offset: impl Into<DayOffset>) -> Self {
        Self {
            offset: offset.into(),
        }
    }

    /// The configured offset.
    pub fn offset(&self) -> DayOffset {
        self.offset
    }

    /// Day a modification time is attributed to.
    pub fn day_of(&self, modified: SystemTime) -> NaiveDate {
        self.offset.day_of(modified)
    }

    /// Build a listing from the entries of one directory.
    ///
    /// Anything that is not a regular file is skipped.
    pub fn bucket(&self, entries: impl IntoIterator<Item = FileEntry>) -> Listing {
        let mut days: BTreeMap<NaiveDate, Vec<FileEntry>> = BTreeMap::new();
        for entry in entries.into_iter().filter(FileEntry::is_file) {
            days.entry(self.day_of(entry.modified)).or_default().push(entry);
        }
        for entries in days.values_mut() {
            entries.sort_by(|a, b| a.path.cmp(&b.path));
        }
        Listing { days }
    }
}

/// Immutable snapshot of a directory's files, keyed by day.
///
/// A listing is never refreshed. Build a new one to observe changes made
/// to the directory after it was taken.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    days: BTreeMap<NaiveDate, Vec<FileEntry>>,
}

impl Listing {
    /// Create an empty listing.
    pub fn new() -> Self {
        Self::default()
    }

    /// All days with at least one file.
    pub fn all_days(&self) -> BTreeSet<NaiveDate> {
        self.days.keys().copied().collect()
    }

    /// Files attributed to `day`, ordered by path. Empty if none.
    pub fn list(&self, day: NaiveDate) -> &[FileEntry] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or_default()
    }

    /// Iterate over all files, day by day.
    pub fn entries(&self) -> impl Iterator<Item = &FileEntry> {
        self.days.values().flatten()
    }

    /// Number of days in the listing.
    pub fn day_count(&self) -> usize {
        self.days.len()
    }

    /// Total number of files.
    pub fn len(&self) -> usize {
        self.days.values().map(Vec::len).sum()
    }

    /// Check if the listing holds no files.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn entry(name: &str, modified: SystemTime) -> FileEntry {
        FileEntry::file(format!("/ws/{name}"), modified, modified, 4)
    }

    #[test]
    fn test_bucket_skips_directories() {
        let now = SystemTime::now();
        let bucketer = DayBucketer::default();
        let listing = bucketer.bucket(vec![
            FileEntry::directory("/ws/daily", now),
            entry("backup.tar", now),
        ]);

        assert_eq!(listing.len(), 1);
        assert_eq!(listing.day_count(), 1);
        let day = bucketer.day_of(now);
        assert_eq!(listing.list(day)[0].path, std::path::PathBuf::from("/ws/backup.tar"));
    }

    #[test]
    fn test_bucket_sorts_entries_by_path() {
        let now = SystemTime::now();
        let bucketer = DayBucketer::default();
        let listing = bucketer.bucket(vec![entry("b", now), entry("a", now)]);

        let names: Vec<_> = listing
            .list(bucketer.day_of(now))
            .iter()
            .map(|e| e.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_empty_listing() {
        let listing = DayBucketer::new(6).bucket(Vec::new());
        assert!(listing.is_empty());
        assert!(listing.all_days().is_empty());

        let day = NaiveDate::from_ymd_opt(2000, 12, 30).unwrap();
        assert!(listing.list(day).is_empty());
    }

    #[test]
    fn test_distinct_days() {
        let now = SystemTime::now();
        let week_ago = now - Duration::from_secs(7 * 24 * 60 * 60);
        let listing = DayBucketer::default().bucket(vec![entry("new", now), entry("old", week_ago)]);

        assert_eq!(listing.day_count(), 2);
        assert_eq!(listing.entries().count(), 2);
    }
}
