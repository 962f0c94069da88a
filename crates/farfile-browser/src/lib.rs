//! Remote directory browsing state for farfile.
//!
//! [`FileBrowser`] is the owned context an application creates once and
//! drives: it holds navigation history, the current listing, the selection,
//! the clipboard and the transfer queue, and reconciles them against a slow,
//! fallible [`DeviceCommands`](farfile_core::DeviceCommands) backend without
//! blocking callers.

mod browser;
mod clipboard;
mod error;
mod events;
mod filter;
mod loader;
mod navigation;
mod selection;

pub use browser::{FileBrowser, OperationTicket};
pub use clipboard::{ClipboardManager, ClipboardPayload};
pub use error::BrowserError;
pub use events::BrowserEvent;
pub use filter::ViewFilter;
pub use loader::{DirectoryLoader, LoadApplied, LoadRequest, LoadResult, LoadToken};
pub use navigation::NavigationHistory;
pub use selection::SelectionModel;
