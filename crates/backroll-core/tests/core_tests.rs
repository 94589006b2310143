use backroll_core::{DayBucketer, DayOffset, FileEntry, Listing, RollError, StorageOperation, Tier};
use chrono::{Local, NaiveDate, NaiveDateTime, TimeZone};
use std::path::PathBuf;
use std::time::SystemTime;

fn at(s: &str) -> SystemTime {
    let naive = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").unwrap();
    Local.from_local_datetime(&naive).earliest().unwrap().into()
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn file(name: &str, modified: &str) -> FileEntry {
    let modified = at(modified);
    FileEntry::file(PathBuf::from("/ws").join(name), modified, modified, 4)
}

fn names(listing: &Listing, day: NaiveDate) -> Vec<String> {
    listing
        .list(day)
        .iter()
        .map(|e| e.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_single_day() {
    let listing = DayBucketer::default().bucket(vec![file("test", "2000-12-31 00:00:00")]);

    assert_eq!(listing.all_days().into_iter().collect::<Vec<_>>(), vec![date(2000, 12, 31)]);
}

#[test]
fn test_two_days() {
    let listing = DayBucketer::default().bucket(vec![
        file("test1", "2000-12-31 00:00:00"),
        file("test2", "2000-12-30 00:00:00"),
    ]);

    assert_eq!(
        listing.all_days().into_iter().collect::<Vec<_>>(),
        vec![date(2000, 12, 30), date(2000, 12, 31)]
    );
}

#[test]
fn test_no_offset_by_default() {
    let listing = DayBucketer::default().bucket(vec![
        file("first", "2000-12-31 00:00:00"),
        file("last", "2000-12-31 23:59:59"),
    ]);

    assert_eq!(listing.day_count(), 1);
    assert_eq!(names(&listing, date(2000, 12, 31)), vec!["first", "last"]);
}

#[test]
fn test_positive_offset() {
    let listing = DayBucketer::new(1).bucket(vec![
        file("first", "2000-12-30 23:00:00"),
        file("last", "2000-12-31 22:59:59"),
        file("next", "2000-12-31 23:00:00"),
    ]);

    assert_eq!(names(&listing, date(2000, 12, 31)), vec!["first", "last"]);
    assert_eq!(names(&listing, date(2001, 1, 1)), vec!["next"]);
    assert!(listing.list(date(2000, 12, 30)).is_empty());
}

#[test]
fn test_negative_offset() {
    let listing = DayBucketer::new(-1).bucket(vec![
        file("first", "2000-12-30 01:00:00"),
        file("last", "2000-12-31 00:59:59"),
    ]);

    assert_eq!(listing.all_days().into_iter().collect::<Vec<_>>(), vec![date(2000, 12, 30)]);
    assert_eq!(listing.len(), 2);
}

#[test]
fn test_offset_boundary_at_midnight_minus_offset() {
    let bucketer = DayBucketer::new(DayOffset::hours(6));
    let listing = bucketer.bucket(vec![
        file("before", "2000-06-13 17:59:59"),
        file("boundary", "2000-06-13 18:00:00"),
        file("late", "2000-06-13 23:59:59"),
    ]);

    assert_eq!(names(&listing, date(2000, 6, 13)), vec!["before"]);
    assert_eq!(names(&listing, date(2000, 6, 14)), vec!["boundary", "late"]);
}

#[test]
fn test_directories_never_listed() {
    let modified = at("2000-12-31 00:00:00");
    let listing = DayBucketer::default().bucket(vec![
        FileEntry::directory("/ws/testdir", modified),
        FileEntry::file("/ws/testfile", modified, modified, 1),
    ]);

    assert_eq!(names(&listing, date(2000, 12, 31)), vec!["testfile"]);
}

#[test]
fn test_error_display_names_operation_and_path() {
    let err = RollError::storage(
        StorageOperation::Remove,
        "/srv/backups/daily/db.sql",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
    );
    let message = err.to_string();
    assert!(message.contains("remove"));
    assert!(message.contains("/srv/backups/daily/db.sql"));
}

#[test]
fn test_tier_serialization() {
    assert_eq!(Tier::Monthly.to_string(), "monthly");
    assert_eq!(serde_json::to_string(&Tier::Weekly).unwrap(), "\"weekly\"");
}
