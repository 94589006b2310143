//! Filesystem capability used by the retention engine.

use std::fs::{self, File, FileTimes};
use std::io;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use backroll_core::{EntryKind, FileEntry};

/// The filesystem operations the retention engine needs.
///
/// All calls block. Listings are non-recursive.
pub trait Filesystem {
    /// List the entries directly inside `path`.
    fn list_directory(&self, path: &Path) -> io::Result<Vec<FileEntry>>;

    /// Copy the bytes of `src` to `dst`, replacing `dst` if it exists.
    /// Returns the number of bytes copied.
    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64>;

    /// Set the access and modification times of `path`.
    fn set_times(&self, path: &Path, accessed: SystemTime, modified: SystemTime) -> io::Result<()>;

    /// Create `path` unless it is already a directory. The parent must exist.
    /// Returns `true` if the directory was created.
    fn make_directory_if_absent(&self, path: &Path) -> io::Result<bool>;

    /// Remove a single file.
    fn remove_file(&self, path: &Path) -> io::Result<()>;

    /// Check if `path` is an existing directory.
    fn directory_exists(&self, path: &Path) -> bool;
}

/// [`Filesystem`] backed by the local disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFs;

impl LocalFs {
    /// Create a local filesystem handle.
    pub fn new() -> Self {
        Self
    }
}

impl Filesystem for LocalFs {
    fn list_directory(&self, path: &Path) -> io::Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for entry in fs::read_dir(path)? {
            let entry_path = entry?.path();

            // Follow symlinks: a link to a regular file is a file.
            let metadata = match fs::metadata(&entry_path) {
                Ok(m) => m,
                Err(err) => {
                    tracing::warn!(path = %entry_path.display(), %err, "Cannot read entry metadata");
                    entries.push(FileEntry {
                        path: entry_path,
                        kind: EntryKind::Other,
                        modified: UNIX_EPOCH,
                        accessed: UNIX_EPOCH,
                        len: 0,
                    });
                    continue;
                }
            };

            let kind = if metadata.is_file() {
                EntryKind::File
            } else if metadata.is_dir() {
                EntryKind::Directory
            } else {
                EntryKind::Other
            };
            let modified = metadata.modified().unwrap_or(UNIX_EPOCH);
            entries.push(FileEntry {
                path: entry_path,
                kind,
                modified,
                accessed: metadata.accessed().unwrap_or(modified),
                len: metadata.len(),
            });
        }
        Ok(entries)
    }

    fn copy_file(&self, src: &Path, dst: &Path) -> io::Result<u64> {
        match fs::copy(src, dst) {
            // An earlier copy of a read-only backup is itself read-only.
            Err(err) if err.kind() == io::ErrorKind::PermissionDenied && is_read_only(dst) => {
                fs::remove_file(dst)?;
                fs::copy(src, dst)
            }
            result => result,
        }
    }

    fn set_times(&self, path: &Path, accessed: SystemTime, modified: SystemTime) -> io::Result<()> {
        let file = open_for_times(path)?;
        file.set_times(FileTimes::new().set_accessed(accessed).set_modified(modified))
    }

    fn make_directory_if_absent(&self, path: &Path) -> io::Result<bool> {
        if path.is_dir() {
            return Ok(false);
        }
        match fs::create_dir(path) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == io::ErrorKind::AlreadyExists && path.is_dir() => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn remove_file(&self, path: &Path) -> io::Result<()> {
        fs::remove_file(path)
    }

    fn directory_exists(&self, path: &Path) -> bool {
        path.is_dir()
    }
}

fn is_read_only(path: &Path) -> bool {
    fs::symlink_metadata(path).is_ok_and(|m| m.is_file() && m.permissions().readonly())
}

/// Open `path` so its times can be changed without needing write access to
/// its contents.
#[cfg(unix)]
fn open_for_times(path: &Path) -> io::Result<File> {
    // futimens checks ownership, not the open mode.
    File::open(path)
}

#[cfg(windows)]
fn open_for_times(path: &Path) -> io::Result<File> {
    use std::os::windows::fs::OpenOptionsExt;

    const FILE_WRITE_ATTRIBUTES: u32 = 0x0100;
    File::options().access_mode(FILE_WRITE_ATTRIBUTES).open(path)
}

#[cfg(not(any(unix, windows)))]
fn open_for_times(path: &Path) -> io::Result<File> {
    File::options().write(true).open(path)
}
