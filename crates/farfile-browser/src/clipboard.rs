//! Single-slot clipboard for copy/cut payloads.

use std::sync::Arc;

use farfile_core::FileEntry;
use farfile_ops::ClipboardOperation;

/// Entries held for a later paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClipboardPayload {
    /// Copy or move on paste.
    pub operation: ClipboardOperation,
    /// Directory the entries were taken from.
    pub source_path: String,
    /// Full entry snapshots, not just names.
    pub entries: Vec<FileEntry>,
}

impl ClipboardPayload {
    /// Check if an entry with this name is in the payload.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|e| e.name == name)
    }
}

/// Holds at most one payload; a new copy or cut replaces the old one.
///
/// The payload survives navigation.
#[derive(Debug, Clone, Default)]
pub struct ClipboardManager {
    payload: Option<Arc<ClipboardPayload>>,
}

impl ClipboardManager {
    /// Create an empty clipboard.
    pub fn new() -> Self {
        Self::default()
    }

    /// The current payload, if any.
    pub fn payload(&self) -> Option<Arc<ClipboardPayload>> {
        self.payload.clone()
    }

    /// Check if the clipboard holds nothing.
    pub fn is_empty(&self) -> bool {
        self.payload.is_none()
    }

    /// Number of entries held.
    pub fn len(&self) -> usize {
        self.payload.as_ref().map_or(0, |p| p.entries.len())
    }

    /// The held operation, if any.
    pub fn operation(&self) -> Option<ClipboardOperation> {
        self.payload.as_ref().map(|p| p.operation)
    }

    /// Hold entries for a later copy.
    pub fn copy(&mut self, source_path: impl Into<String>, entries: Vec<FileEntry>) {
        self.set(ClipboardOperation::Copy, source_path, entries);
    }

    /// Hold entries for a later move.
    pub fn cut(&mut self, source_path: impl Into<String>, entries: Vec<FileEntry>) {
        self.set(ClipboardOperation::Cut, source_path, entries);
    }

    /// Overwrite the slot.
    pub fn set(
        &mut self,
        operation: ClipboardOperation,
        source_path: impl Into<String>,
        entries: Vec<FileEntry>,
    ) {
        self.payload = Some(Arc::new(ClipboardPayload {
            operation,
            source_path: source_path.into(),
            entries,
        }));
    }

    /// Empty the slot.
    pub fn clear(&mut self) {
        self.payload = None;
    }

    /// Whether `name` should be drawn as pending a move.
    ///
    /// True only for a cut payload containing `name`, and only while the
    /// displayed path is the directory it was cut from.
    pub fn is_cut_file(&self, name: &str, displayed_path: &str) -> bool {
        self.payload.as_ref().is_some_and(|p| {
            p.operation == ClipboardOperation::Cut
                && p.source_path == displayed_path
                && p.contains(name)
        })
    }
}
