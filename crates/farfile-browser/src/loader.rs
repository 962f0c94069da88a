//! Directory loading with stale-response protection.
//!
//! Loads are not serialized: two quick navigations put two `list_directory`
//! calls in flight. Each load carries a [`LoadToken`]; only the result for the
//! most recently issued token is applied, anything older is dropped.

use farfile_core::{DeviceCommands, DeviceResult, DirectoryListing, FileEntry};
use tracing::{debug, warn};

/// Monotonically increasing id for a directory load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LoadToken(pub u64);

/// A load that has been issued and is waiting for the device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub token: LoadToken,
    pub device_id: String,
    pub path: String,
}

impl LoadRequest {
    /// Ask the device for the listing.
    pub async fn fetch(self, device: &dyn DeviceCommands) -> LoadResult {
        let result = device.list_directory(&self.device_id, &self.path).await;
        LoadResult {
            token: self.token,
            path: self.path,
            result,
        }
    }
}

/// What the device answered for one load.
#[derive(Debug, Clone)]
pub struct LoadResult {
    pub token: LoadToken,
    pub path: String,
    pub result: DeviceResult<Vec<FileEntry>>,
}

/// How a [`LoadResult`] affected the loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadApplied {
    /// The listing was replaced.
    Loaded { path: String, entries: usize },
    /// The load failed; the listing is now empty.
    Failed { path: String, message: String },
    /// The result belonged to a superseded load and was dropped.
    Stale { path: String },
}

/// Owns the current listing and its loading/error state.
#[derive(Debug, Default)]
pub struct DirectoryLoader {
    listing: DirectoryListing,
    is_loading: bool,
    error: Option<String>,
    issued: u64,
    latest: Option<LoadToken>,
}

impl DirectoryLoader {
    /// Create an empty loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently applied listing.
    pub fn listing(&self) -> &DirectoryListing {
        &self.listing
    }

    /// Check if the most recent load is still in flight.
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Message of the last failed load, cleared when a new load starts.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Token of the load whose result will be accepted.
    pub fn latest_token(&self) -> Option<LoadToken> {
        self.latest
    }

    /// Issue a new load, superseding any in flight.
    pub fn begin(&mut self, device_id: impl Into<String>, path: impl Into<String>) -> LoadRequest {
        self.issued += 1;
        let token = LoadToken(self.issued);
        self.latest = Some(token);
        self.is_loading = true;
        self.error = None;

        let request = LoadRequest {
            token,
            device_id: device_id.into(),
            path: path.into(),
        };
        debug!(token = token.0, path = %request.path, "Directory load issued");
        request
    }

    /// Apply a device response if it belongs to the latest load.
    pub fn apply(&mut self, result: LoadResult) -> LoadApplied {
        if self.latest != Some(result.token) {
            warn!(
                token = result.token.0,
                path = %result.path,
                "Discarding stale directory listing"
            );
            return LoadApplied::Stale { path: result.path };
        }

        self.is_loading = false;
        match result.result {
            Ok(entries) => {
                let listing = DirectoryListing::new(result.path.clone(), entries);
                let count = listing.len();
                self.listing = listing;
                debug!(path = %result.path, entries = count, "Directory loaded");
                LoadApplied::Loaded {
                    path: result.path,
                    entries: count,
                }
            }
            Err(e) => {
                let message = e.message().to_string();
                warn!(path = %result.path, error = %message, "Directory load failed");
                self.listing = DirectoryListing::empty(result.path.clone());
                self.error = Some(message.clone());
                LoadApplied::Failed {
                    path: result.path,
                    message,
                }
            }
        }
    }

    /// Issue, await and apply a load in one step.
    pub async fn load(
        &mut self,
        device: &dyn DeviceCommands,
        device_id: &str,
        path: &str,
    ) -> LoadApplied {
        let request = self.begin(device_id, path);
        let result = request.fetch(device).await;
        self.apply(result)
    }

    /// Drop the listing and invalidate every in-flight load.
    pub fn reset(&mut self, path: impl Into<String>) {
        self.listing = DirectoryListing::empty(path);
        self.is_loading = false;
        self.error = None;
        self.latest = None;
    }
}
