//! Remote operation types.

use serde::{Deserialize, Serialize};
use strum::Display;
use thiserror::Error;

use farfile_core::FileEntry;

/// Whether a clipboard payload is copied or moved on paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClipboardOperation {
    Copy,
    Cut,
}

/// A remote mutation to be executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum RemoteOperation {
    /// Delete remote entries by path.
    Delete { targets: Vec<String> },
    /// Rename a single entry within its directory.
    Rename { source: String, new_name: String },
    /// Create a directory inside `parent`.
    CreateDirectory { parent: String, name: String },
    /// Copy or move entries into a destination directory.
    Paste {
        operation: ClipboardOperation,
        sources: Vec<FileEntry>,
        destination: String,
    },
}

impl RemoteOperation {
    /// Create a delete operation.
    pub fn delete(targets: Vec<String>) -> Self {
        Self::Delete { targets }
    }

    /// Create a rename operation.
    pub fn rename(source: impl Into<String>, new_name: impl Into<String>) -> Self {
        Self::Rename {
            source: source.into(),
            new_name: new_name.into(),
        }
    }

    /// Create a directory creation operation.
    pub fn create_directory(parent: impl Into<String>, name: impl Into<String>) -> Self {
        Self::CreateDirectory {
            parent: parent.into(),
            name: name.into(),
        }
    }

    /// Create a paste operation.
    pub fn paste(
        operation: ClipboardOperation,
        sources: Vec<FileEntry>,
        destination: impl Into<String>,
    ) -> Self {
        Self::Paste {
            operation,
            sources,
            destination: destination.into(),
        }
    }
}

/// An error that occurred for one item of a remote operation.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{path}: {message}")]
pub struct OperationError {
    /// The remote path that caused the error.
    pub path: String,
    /// A human-readable error message.
    pub message: String,
}

impl OperationError {
    /// Create a new operation error.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Validate a new entry name.
pub fn validate_filename(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("Name cannot be empty".into());
    }

    if name.len() > 255 {
        return Err("Name is too long (max 255 characters)".into());
    }

    for c in ['/', '\0'] {
        if name.contains(c) {
            return Err(format!("Name cannot contain '{}'", c));
        }
    }

    if name.starts_with(' ') || name.ends_with(' ') {
        return Err("Name cannot start or end with spaces".into());
    }

    if name == "." || name == ".." {
        return Err("'.' and '..' are reserved names".into());
    }

    Ok(())
}
