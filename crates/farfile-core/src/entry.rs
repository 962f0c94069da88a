//! Remote file entries and directory listings.

use std::cmp::Ordering;

use compact_str::CompactString;
use humansize::{DECIMAL, format_size};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// A single file or directory reported by the remote device.
///
/// Entries are immutable snapshots. They are only ever replaced wholesale
/// when a directory is reloaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Entry name (not full path).
    pub name: CompactString,

    /// Full remote path of the entry.
    pub path: String,

    /// Whether the entry is a directory.
    pub is_dir: bool,

    /// Size in bytes, when the device reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    /// Unix-style permission string, e.g. `drwxrwxrwx`.
    #[serde(default)]
    pub permissions: String,
}

impl FileEntry {
    /// Create a file entry.
    pub fn file(name: impl Into<CompactString>, path: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: false,
            size: Some(size),
            permissions: "-rw-rw----".to_string(),
        }
    }

    /// Create a directory entry.
    pub fn directory(name: impl Into<CompactString>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            is_dir: true,
            size: None,
            permissions: "drwxrwx--x".to_string(),
        }
    }

    /// Replace the permission string.
    pub fn with_permissions(mut self, permissions: impl Into<String>) -> Self {
        self.permissions = permissions.into();
        self
    }

    /// Check if the entry name starts with a dot.
    pub fn is_hidden(&self) -> bool {
        self.name.starts_with('.')
    }

    /// Human-readable access summary derived from the owner permission triplet.
    pub fn permission_label(&self) -> &str {
        let perms = self.permissions.as_str();
        if perms.len() < 4 || !perms.is_char_boundary(4) {
            return perms;
        }

        match &perms[1..4] {
            "rwx" => "Full Access",
            "rw-" => "Read & Write",
            "r--" => "Read Only",
            "--x" => "Execute Only",
            owner if owner.contains('r') && owner.contains('w') => "Read & Write",
            _ => perms,
        }
    }

    /// Size formatted for display, or `-` when unknown.
    pub fn display_size(&self) -> String {
        match self.size {
            Some(size) => format_size(size, DECIMAL),
            None => "-".to_string(),
        }
    }

    /// Listing order: directories first, then case-sensitive name order.
    pub fn listing_order(a: &FileEntry, b: &FileEntry) -> Ordering {
        b.is_dir.cmp(&a.is_dir).then_with(|| a.name.cmp(&b.name))
    }
}

/// The contents of one remote directory, in listing order.
///
/// Deserialized listings are re-sorted, so stored order is never trusted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "UnsortedListing")]
pub struct DirectoryListing {
    /// The directory this listing belongs to.
    pub path: String,
    entries: Vec<FileEntry>,
}

#[derive(Deserialize)]
struct UnsortedListing {
    path: String,
    entries: Vec<FileEntry>,
}

impl From<UnsortedListing> for DirectoryListing {
    fn from(raw: UnsortedListing) -> Self {
        Self::new(raw.path, raw.entries)
    }
}

impl DirectoryListing {
    /// Create a listing, sorting entries into listing order.
    pub fn new(path: impl Into<String>, entries: Vec<FileEntry>) -> Self {
        Self {
            path: path.into(),
            entries: entries
                .into_iter()
                .sorted_by(FileEntry::listing_order)
                .collect(),
        }
    }

    /// An empty listing for a path.
    pub fn empty(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entries: Vec::new(),
        }
    }

    /// Entries in listing order.
    pub fn entries(&self) -> &[FileEntry] {
        &self.entries
    }

    /// Find an entry by name.
    pub fn get(&self, name: &str) -> Option<&FileEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the listing has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over entries in listing order.
    pub fn iter(&self) -> std::slice::Iter<'_, FileEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a DirectoryListing {
    type Item = &'a FileEntry;
    type IntoIter = std::slice::Iter<'a, FileEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
