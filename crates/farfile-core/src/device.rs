//! The device command interface.

use std::path::Path;

use async_trait::async_trait;

use crate::entry::FileEntry;
use crate::error::{DeviceError, DeviceResult};

/// Commands a remote device accepts.
///
/// Every call is asynchronous and may fail with an opaque
/// [`DeviceError::OperationFailed`]. Implementations own transport concerns,
/// including any timeouts.
#[async_trait]
pub trait DeviceCommands: Send + Sync {
    /// List the entries of a remote directory.
    async fn list_directory(&self, device_id: &str, path: &str) -> DeviceResult<Vec<FileEntry>>;

    /// Delete a remote file or directory.
    async fn delete_entry(&self, device_id: &str, path: &str) -> DeviceResult<()>;

    /// Rename or move a remote entry.
    async fn rename_entry(&self, device_id: &str, old_path: &str, new_path: &str)
    -> DeviceResult<()>;

    /// Create a remote directory.
    async fn create_directory(&self, device_id: &str, path: &str) -> DeviceResult<()>;

    /// Read the full contents of a remote file.
    async fn read_file_bytes(&self, device_id: &str, path: &str) -> DeviceResult<Vec<u8>>;

    /// Push a local file to a remote path.
    async fn upload_file(
        &self,
        device_id: &str,
        local_path: &Path,
        remote_path: &str,
    ) -> DeviceResult<()>;

    /// Pull a remote file to a local destination.
    async fn download_file(
        &self,
        device_id: &str,
        remote_path: &str,
        local_destination: &Path,
    ) -> DeviceResult<()>;

    /// Copy a remote entry to another remote path.
    ///
    /// Optional capability; devices without server-side copy reject it.
    async fn copy_entry(
        &self,
        _device_id: &str,
        _source_path: &str,
        _destination_path: &str,
    ) -> DeviceResult<()> {
        Err(DeviceError::failed("copy is not supported by this device"))
    }
}
