//! Directory entries as reported by a filesystem listing.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Type of a directory entry, after resolving symbolic links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
    /// Anything else: sockets, devices, broken links, unreadable entries.
    Other,
}

/// A single entry directly inside a listed directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Full path of the entry.
    pub path: PathBuf,
    /// Kind of entry.
    pub kind: EntryKind,
    /// Last modification time.
    pub modified: SystemTime,
    /// Last access time.
    pub accessed: SystemTime,
    /// Size in bytes.
    pub len: u64,
}

impl FileEntry {
    /// Create a regular file entry.
    pub fn file(path: impl Into<PathBuf>, modified: SystemTime, accessed: SystemTime, len: u64) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::File,
            modified,
            accessed,
            len,
        }
    }

    /// Create a directory entry.
    pub fn directory(path: impl Into<PathBuf>, modified: SystemTime) -> Self {
        Self {
            path: path.into(),
            kind: EntryKind::Directory,
            modified,
            accessed: modified,
            len: 0,
        }
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == EntryKind::File
    }

    /// Final path component, used as the destination name in a store.
    pub fn file_name(&self) -> Option<&std::ffi::OsStr> {
        self.path.file_name()
    }

    /// Path of the entry.
    pub fn path(&self) -> &Path {
        &self.path
    }
}
