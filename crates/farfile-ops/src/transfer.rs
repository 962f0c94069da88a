//! Background uploads and downloads tracked in a [`TransferTaskQueue`].

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use farfile_core::path::{file_name_of, join_remote};
use farfile_core::{DeviceCommands, DeviceError};

use crate::queue::TransferTaskQueue;
use crate::task::{TaskDescriptor, TaskId, TaskUpdate, TransferKind};

/// How a transfer settled.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferOutcome {
    /// The task that tracked this transfer.
    pub id: TaskId,
    /// Upload or download.
    pub kind: TransferKind,
    /// Display name of the task.
    pub name: String,
    /// Remote side of the transfer.
    pub remote_path: String,
    /// `Ok` on success, the device failure otherwise.
    pub result: Result<(), DeviceError>,
}

impl TransferOutcome {
    /// Check if the transfer succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Handle to a running transfer.
#[derive(Debug)]
pub struct TransferHandle {
    /// The task tracking this transfer.
    pub id: TaskId,
    kind: TransferKind,
    name: String,
    remote_path: String,
    join: JoinHandle<TransferOutcome>,
}

impl TransferHandle {
    /// Wait for the transfer to settle.
    pub async fn wait(self) -> TransferOutcome {
        match self.join.await {
            Ok(outcome) => outcome,
            Err(e) => TransferOutcome {
                id: self.id,
                kind: self.kind,
                name: self.name,
                remote_path: self.remote_path,
                result: Err(DeviceError::failed(format!("Transfer task failed: {e}"))),
            },
        }
    }
}

/// Starts transfers against a device and records them in a queue.
///
/// Every transfer is spawned immediately and runs independently; completion
/// order is whatever order the device calls settle in. Must be used from
/// within a tokio runtime.
#[derive(Clone)]
pub struct TransferLauncher {
    device: Arc<dyn DeviceCommands>,
    queue: TransferTaskQueue,
    completions: Option<mpsc::UnboundedSender<TransferOutcome>>,
}

impl std::fmt::Debug for TransferLauncher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransferLauncher")
            .field("queue", &self.queue)
            .finish_non_exhaustive()
    }
}

impl TransferLauncher {
    /// Create a launcher that records tasks in `queue`.
    pub fn new(device: Arc<dyn DeviceCommands>, queue: TransferTaskQueue) -> Self {
        Self {
            device,
            queue,
            completions: None,
        }
    }

    /// Also report every settled transfer on a channel.
    pub fn with_completions(mut self, tx: mpsc::UnboundedSender<TransferOutcome>) -> Self {
        self.completions = Some(tx);
        self
    }

    /// The queue tasks are recorded in.
    pub fn queue(&self) -> &TransferTaskQueue {
        &self.queue
    }

    /// Upload a local file into a remote directory, keeping its file name.
    pub fn upload(&self, device_id: &str, local_path: PathBuf, remote_dir: &str) -> TransferHandle {
        let name = file_name_of(&local_path.to_string_lossy()).to_string();
        let remote_path = join_remote(remote_dir, &name);
        self.upload_to(device_id, local_path, remote_path)
    }

    /// Upload a local file to an exact remote path.
    pub fn upload_to(
        &self,
        device_id: &str,
        local_path: PathBuf,
        remote_path: String,
    ) -> TransferHandle {
        let name = file_name_of(&remote_path).to_string();
        let device = Arc::clone(&self.device);
        let device_id = device_id.to_string();
        let remote = remote_path.clone();

        self.spawn(TaskDescriptor::upload(name), remote_path, async move {
            device.upload_file(&device_id, &local_path, &remote).await
        })
    }

    /// Download a remote file to a local destination.
    pub fn download(
        &self,
        device_id: &str,
        remote_path: &str,
        local_destination: PathBuf,
    ) -> TransferHandle {
        let name = file_name_of(remote_path).to_string();
        let device = Arc::clone(&self.device);
        let device_id = device_id.to_string();
        let remote = remote_path.to_string();

        self.spawn(
            TaskDescriptor::download(name),
            remote_path.to_string(),
            async move {
                device
                    .download_file(&device_id, &remote, &local_destination)
                    .await
            },
        )
    }

    fn spawn<F>(&self, descriptor: TaskDescriptor, remote_path: String, call: F) -> TransferHandle
    where
        F: Future<Output = Result<(), DeviceError>> + Send + 'static,
    {
        let kind = descriptor.kind;
        let name = descriptor.name.clone();
        let id = self.queue.add_task(descriptor);

        let queue = self.queue.clone();
        let completions = self.completions.clone();
        let outcome_name = name.clone();
        let outcome_path = remote_path.clone();

        let join = tokio::spawn(async move {
            let result = match tokio::spawn(call).await {
                Ok(result) => result,
                Err(e) => Err(DeviceError::failed(format!("Transfer task failed: {e}"))),
            };

            match &result {
                Ok(()) => {
                    info!(%id, %kind, name = %outcome_name, "Transfer completed");
                    queue.update_task(id, TaskUpdate::completed());
                }
                Err(e) => {
                    warn!(%id, %kind, name = %outcome_name, error = %e, "Transfer failed");
                    queue.update_task(id, TaskUpdate::failed(e.message()));
                }
            }

            let outcome = TransferOutcome {
                id,
                kind,
                name: outcome_name,
                remote_path: outcome_path,
                result,
            };
            if let Some(tx) = completions {
                let _ = tx.send(outcome.clone());
            }
            outcome
        });

        TransferHandle {
            id,
            kind,
            name,
            remote_path,
            join,
        }
    }
}
