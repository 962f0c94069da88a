//! Core types and traits for farfile.
//!
//! This crate provides the vocabulary shared by the rest of the farfile
//! ecosystem: remote file entries and listings, remote path helpers, the
//! device command interface, and browser configuration.

mod config;
mod device;
mod entry;
mod error;
pub mod path;

pub use config::{BrowserConfig, BrowserConfigBuilder, BrowserConfigBuilderError, SearchMode};
pub use device::DeviceCommands;
pub use entry::{DirectoryListing, FileEntry};
pub use error::{ConfigError, DeviceError, DeviceResult};
