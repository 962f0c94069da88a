//! Change notifications for presentation layers.

use farfile_ops::{ClipboardOperation, OperationType, TaskId};

/// Something observable changed in a [`FileBrowser`](crate::FileBrowser).
///
/// Delivered on a broadcast channel; subscribers that fall behind lose the
/// oldest events and can resynchronise from the browser's accessors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowserEvent {
    /// The selected device changed.
    DeviceChanged { device_id: Option<String> },
    /// The displayed path changed.
    PathChanged { path: String },
    /// A directory load was issued.
    LoadStarted { path: String },
    /// A listing replaced the previous one.
    ListingLoaded { path: String, entries: usize },
    /// A load failed and the listing was cleared.
    LoadFailed { path: String, message: String },
    /// The selection changed.
    SelectionChanged { selected: usize },
    /// The clipboard was set or cleared.
    ClipboardChanged {
        operation: Option<ClipboardOperation>,
        entries: usize,
    },
    /// Hidden-file visibility or search text changed.
    FilterChanged,
    /// A transfer settled.
    TransferSettled { id: TaskId, success: bool },
    /// A remote mutation finished.
    OperationFinished {
        operation_type: OperationType,
        succeeded: usize,
        failed: usize,
    },
}
