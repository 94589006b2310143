//! Error types for retention runs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

/// Storage operation that failed on a specific path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
pub enum StorageOperation {
    /// Creating a retention directory.
    #[strum(to_string = "create directory")]
    CreateDirectory,
    /// Listing a retention directory.
    List,
    /// Copying a file into a retention directory.
    Copy,
    /// Setting the timestamps of a copied file.
    #[strum(to_string = "set times")]
    SetTimes,
    /// Removing a file.
    Remove,
}

/// Errors that can abort a retention run.
#[derive(Debug, Error)]
pub enum RollError {
    /// The workspace directory cannot be listed.
    #[error("Cannot access workspace {path}: {source}")]
    FilesystemAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A storage operation failed on a specific path.
    #[error("Failed to {operation} {path}: {source}")]
    Storage {
        operation: StorageOperation,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid or contradictory configuration.
    #[error("Invalid configuration: {message}")]
    Configuration { message: String },
}

impl RollError {
    /// Create a storage error with path context.
    pub fn storage(
        operation: StorageOperation,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        Self::Storage {
            operation,
            path: path.into(),
            source,
        }
    }

    /// Create a workspace access error with path context.
    pub fn access(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::FilesystemAccess {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Path the error refers to, if any.
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FilesystemAccess { path, .. } | Self::Storage { path, .. } => Some(path),
            Self::Configuration { .. } => None,
        }
    }
}
