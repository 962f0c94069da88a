//! Loopback device backed by a local directory.
//!
//! Serves a directory on this machine through [`DeviceCommands`], with the
//! directory acting as the device's `/`. Blocking filesystem calls run on the
//! blocking pool.

use std::fs;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use farfile_core::path::join_remote;
use farfile_core::{DeviceCommands, DeviceError, DeviceResult, FileEntry};

/// A [`DeviceCommands`] backend over a local directory.
#[derive(Debug, Clone)]
pub struct LocalDevice {
    root: PathBuf,
}

impl LocalDevice {
    /// Serve `root` as the device filesystem.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The local directory acting as `/`.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Map a remote path onto the local root, refusing `..` escapes.
    pub fn resolve(&self, remote_path: &str) -> DeviceResult<PathBuf> {
        let mut resolved = self.root.clone();
        for component in Path::new(remote_path.trim_start_matches('/')).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir | Component::RootDir => {}
                Component::ParentDir | Component::Prefix(_) => {
                    return Err(DeviceError::failed(format!(
                        "{remote_path}: path escapes device root"
                    )));
                }
            }
        }
        Ok(resolved)
    }
}

async fn blocking<T, F>(f: F) -> DeviceResult<T>
where
    T: Send + 'static,
    F: FnOnce() -> std::io::Result<T> + Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| DeviceError::failed(format!("Task failed: {e}")))?
        .map_err(DeviceError::from)
}

fn read_entries(dir: &Path, remote_dir: &str) -> std::io::Result<Vec<FileEntry>> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let metadata = entry.metadata()?;
        let name = entry.file_name().to_string_lossy().to_string();
        let is_dir = metadata.is_dir();

        entries.push(FileEntry {
            path: join_remote(remote_dir, &name),
            name: name.into(),
            is_dir,
            size: (!is_dir).then(|| metadata.len()),
            permissions: permission_string(&metadata),
        });
    }
    Ok(entries)
}

#[cfg(unix)]
fn permission_string(metadata: &fs::Metadata) -> String {
    use std::os::unix::fs::PermissionsExt;

    let mode = metadata.permissions().mode();
    let mut out = String::with_capacity(10);
    out.push(if metadata.is_dir() { 'd' } else { '-' });
    for shift in [6, 3, 0] {
        let bits = (mode >> shift) & 0o7;
        out.push(if bits & 0o4 != 0 { 'r' } else { '-' });
        out.push(if bits & 0o2 != 0 { 'w' } else { '-' });
        out.push(if bits & 0o1 != 0 { 'x' } else { '-' });
    }
    out
}

#[cfg(not(unix))]
fn permission_string(metadata: &fs::Metadata) -> String {
    let kind = if metadata.is_dir() { 'd' } else { '-' };
    let write = if metadata.permissions().readonly() { '-' } else { 'w' };
    format!("{kind}r{write}-r{write}-r{write}-")
}

fn copy_recursive(source: &Path, dest: &Path) -> std::io::Result<()> {
    if source.is_dir() {
        fs::create_dir_all(dest)?;
        for entry in fs::read_dir(source)? {
            let entry = entry?;
            copy_recursive(&entry.path(), &dest.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        fs::copy(source, dest).map(|_| ())
    }
}

#[async_trait]
impl DeviceCommands for LocalDevice {
    async fn list_directory(&self, _device_id: &str, path: &str) -> DeviceResult<Vec<FileEntry>> {
        let dir = self.resolve(path)?;
        let remote_dir = path.to_string();
        blocking(move || read_entries(&dir, &remote_dir)).await
    }

    async fn delete_entry(&self, _device_id: &str, path: &str) -> DeviceResult<()> {
        let target = self.resolve(path)?;
        if target == self.root {
            return Err(DeviceError::failed("Refusing to delete the device root"));
        }
        blocking(move || {
            if target.is_dir() {
                fs::remove_dir_all(&target)
            } else {
                fs::remove_file(&target)
            }
        })
        .await
    }

    async fn rename_entry(
        &self,
        _device_id: &str,
        old_path: &str,
        new_path: &str,
    ) -> DeviceResult<()> {
        let from = self.resolve(old_path)?;
        let to = self.resolve(new_path)?;
        blocking(move || {
            if to.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("'{}' already exists", to.display()),
                ));
            }
            fs::rename(&from, &to)
        })
        .await
    }

    async fn create_directory(&self, _device_id: &str, path: &str) -> DeviceResult<()> {
        let dir = self.resolve(path)?;
        blocking(move || fs::create_dir(&dir)).await
    }

    async fn read_file_bytes(&self, _device_id: &str, path: &str) -> DeviceResult<Vec<u8>> {
        let file = self.resolve(path)?;
        blocking(move || fs::read(&file)).await
    }

    async fn upload_file(
        &self,
        _device_id: &str,
        local_path: &Path,
        remote_path: &str,
    ) -> DeviceResult<()> {
        let source = local_path.to_path_buf();
        let dest = self.resolve(remote_path)?;
        blocking(move || fs::copy(&source, &dest).map(|_| ())).await
    }

    async fn download_file(
        &self,
        _device_id: &str,
        remote_path: &str,
        local_destination: &Path,
    ) -> DeviceResult<()> {
        let source = self.resolve(remote_path)?;
        let dest = local_destination.to_path_buf();
        blocking(move || fs::copy(&source, &dest).map(|_| ())).await
    }

    async fn copy_entry(
        &self,
        _device_id: &str,
        source_path: &str,
        destination_path: &str,
    ) -> DeviceResult<()> {
        let source = self.resolve(source_path)?;
        let dest = self.resolve(destination_path)?;
        blocking(move || {
            if dest.exists() {
                return Err(std::io::Error::new(
                    std::io::ErrorKind::AlreadyExists,
                    format!("'{}' already exists", dest.display()),
                ));
            }
            copy_recursive(&source, &dest)
        })
        .await
    }
}
