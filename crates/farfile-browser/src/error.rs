//! Error types for browser actions.

use thiserror::Error;

use farfile_core::DeviceError;

/// Errors returned by [`FileBrowser`](crate::FileBrowser) actions.
///
/// Local state changes (navigation, selection, clipboard) cannot fail; only
/// actions that reach the device can.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BrowserError {
    /// No device is selected.
    #[error("No device selected")]
    NoDevice,

    /// The named entry is not in the current listing.
    #[error("No entry named '{name}' in the current directory")]
    UnknownEntry { name: String },

    /// A file action was attempted on a directory.
    #[error("'{name}' is a directory")]
    IsDirectory { name: String },

    /// The file exceeds the preview limit.
    #[error("'{name}' is too large to preview ({size} bytes, limit {limit})")]
    TooLarge { name: String, size: u64, limit: u64 },

    /// The clipboard is empty.
    #[error("Clipboard is empty")]
    EmptyClipboard,

    /// A remote operation stopped without reporting a result.
    #[error("Remote operation ended without a result")]
    OperationLost,

    /// The device rejected the call.
    #[error(transparent)]
    Device(#[from] DeviceError),
}
