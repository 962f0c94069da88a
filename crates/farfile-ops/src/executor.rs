//! High-level remote operation executor with unified result handling.

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{info, warn};

use farfile_core::path::{ensure_dir_suffix, join_remote, parent_dir};
use farfile_core::{DeviceCommands, DeviceError, DeviceResult, FileEntry};

use crate::operation::{ClipboardOperation, OperationError, RemoteOperation, validate_filename};
use crate::progress::{OperationComplete, OperationProgress, OperationType};
use crate::OPERATION_CHANNEL_SIZE;

/// Unified result type for all operations.
#[derive(Debug)]
pub enum OperationResult {
    /// Progress update.
    Progress(OperationProgress),
    /// The operation completed.
    Complete(OperationComplete),
}

/// One remote call within a batch.
#[derive(Debug)]
enum Step {
    Delete(String),
    Rename { from: String, to: String },
    CreateDirectory(String),
    Copy { from: String, to: String },
    /// Rejected before reaching the device.
    Invalid { path: String, message: String },
}

impl Step {
    fn path(&self) -> &str {
        match self {
            Self::Delete(path) | Self::CreateDirectory(path) => path,
            Self::Rename { from, .. } | Self::Copy { from, .. } => from,
            Self::Invalid { path, .. } => path,
        }
    }
}

/// Executor for remote operations against one device.
#[derive(Clone)]
pub struct OperationExecutor {
    device: Arc<dyn DeviceCommands>,
    device_id: String,
}

impl std::fmt::Debug for OperationExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OperationExecutor")
            .field("device_id", &self.device_id)
            .finish_non_exhaustive()
    }
}

impl OperationExecutor {
    /// Create an executor for a device.
    pub fn new(device: Arc<dyn DeviceCommands>, device_id: impl Into<String>) -> Self {
        Self {
            device,
            device_id: device_id.into(),
        }
    }

    /// The device this executor targets.
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Delete remote entries.
    pub fn delete(&self, targets: Vec<String>) -> mpsc::Receiver<OperationResult> {
        self.execute(RemoteOperation::delete(targets))
    }

    /// Rename an entry within its directory.
    pub fn rename(&self, source: String, new_name: String) -> mpsc::Receiver<OperationResult> {
        self.execute(RemoteOperation::Rename { source, new_name })
    }

    /// Create a directory inside `parent`.
    pub fn create_directory(&self, parent: String, name: String) -> mpsc::Receiver<OperationResult> {
        self.execute(RemoteOperation::CreateDirectory { parent, name })
    }

    /// Copy or move entries into a destination directory.
    pub fn paste(
        &self,
        operation: ClipboardOperation,
        sources: Vec<FileEntry>,
        destination: String,
    ) -> mpsc::Receiver<OperationResult> {
        self.execute(RemoteOperation::Paste {
            operation,
            sources,
            destination,
        })
    }

    /// Execute any remote operation in the background.
    ///
    /// Returns a receiver for progress updates and the final result. Items
    /// are processed in order; a failed item does not stop the batch.
    pub fn execute(&self, operation: RemoteOperation) -> mpsc::Receiver<OperationResult> {
        let (tx, rx) = mpsc::channel(OPERATION_CHANNEL_SIZE);
        let (operation_type, steps) = plan(operation);
        let device = Arc::clone(&self.device);
        let device_id = self.device_id.clone();

        tokio::spawn(async move {
            run_steps(device, device_id, operation_type, steps, tx).await;
        });

        rx
    }

    /// Execute an operation and wait for its final result.
    pub async fn run(&self, operation: RemoteOperation) -> OperationComplete {
        let operation_type = operation_type_of(&operation);
        let mut rx = self.execute(operation);
        while let Some(result) = rx.recv().await {
            if let OperationResult::Complete(complete) = result {
                return complete;
            }
        }

        OperationComplete {
            operation_type,
            succeeded: 0,
            failed: 0,
            errors: vec![OperationError::new("", "operation ended without a result")],
        }
    }
}

fn operation_type_of(operation: &RemoteOperation) -> OperationType {
    match operation {
        RemoteOperation::Delete { .. } => OperationType::Delete,
        RemoteOperation::Rename { .. } => OperationType::Rename,
        RemoteOperation::CreateDirectory { .. } => OperationType::CreateDirectory,
        RemoteOperation::Paste {
            operation: ClipboardOperation::Copy,
            ..
        } => OperationType::Copy,
        RemoteOperation::Paste {
            operation: ClipboardOperation::Cut,
            ..
        } => OperationType::Move,
    }
}

/// Turn an operation into the remote calls it needs.
fn plan(operation: RemoteOperation) -> (OperationType, Vec<Step>) {
    let operation_type = operation_type_of(&operation);
    let steps = match operation {
        RemoteOperation::Delete { targets } => targets.into_iter().map(Step::Delete).collect(),
        RemoteOperation::Rename { source, new_name } => vec![plan_rename(source, &new_name)],
        RemoteOperation::CreateDirectory { parent, name } => match validate_filename(&name) {
            Ok(()) => vec![Step::CreateDirectory(join_remote(&parent, &name))],
            Err(message) => vec![Step::Invalid {
                path: join_remote(&parent, &name),
                message,
            }],
        },
        RemoteOperation::Paste {
            operation,
            sources,
            destination,
        } => sources
            .into_iter()
            .map(|entry| plan_paste(operation, entry, &destination))
            .collect(),
    };

    (operation_type, steps)
}

fn plan_rename(source: String, new_name: &str) -> Step {
    if let Err(message) = validate_filename(new_name) {
        return Step::Invalid {
            path: source,
            message,
        };
    }

    match parent_dir(&source) {
        Some(parent) => Step::Rename {
            to: join_remote(&parent, new_name),
            from: source,
        },
        None => Step::Invalid {
            path: source,
            message: "Cannot rename the root directory".into(),
        },
    }
}

fn plan_paste(operation: ClipboardOperation, entry: FileEntry, destination: &str) -> Step {
    let target = join_remote(destination, &entry.name);
    let source = entry.path;

    if target.trim_end_matches('/') == source.trim_end_matches('/') {
        return Step::Invalid {
            path: source,
            message: "Source and destination are the same".into(),
        };
    }

    if entry.is_dir && ensure_dir_suffix(destination).starts_with(&ensure_dir_suffix(&source)) {
        return Step::Invalid {
            path: source,
            message: "Cannot paste a directory into itself".into(),
        };
    }

    match operation {
        ClipboardOperation::Copy => Step::Copy {
            from: source,
            to: target,
        },
        ClipboardOperation::Cut => Step::Rename {
            from: source,
            to: target,
        },
    }
}

async fn run_step(device: &dyn DeviceCommands, device_id: &str, step: &Step) -> DeviceResult<()> {
    match step {
        Step::Delete(path) => device.delete_entry(device_id, path).await,
        Step::Rename { from, to } => device.rename_entry(device_id, from, to).await,
        Step::CreateDirectory(path) => device.create_directory(device_id, path).await,
        Step::Copy { from, to } => device.copy_entry(device_id, from, to).await,
        Step::Invalid { message, .. } => Err(DeviceError::failed(message.clone())),
    }
}

async fn run_steps(
    device: Arc<dyn DeviceCommands>,
    device_id: String,
    operation_type: OperationType,
    steps: Vec<Step>,
    tx: mpsc::Sender<OperationResult>,
) {
    let mut progress = OperationProgress::new(operation_type, steps.len());
    let mut succeeded = 0;
    let mut failed = 0;

    for step in &steps {
        progress.set_current_path(Some(step.path().to_string()));
        let _ = tx.send(OperationResult::Progress(progress.clone())).await;

        match run_step(device.as_ref(), &device_id, step).await {
            Ok(()) => {
                succeeded += 1;
                progress.complete_item();
            }
            Err(e) => {
                warn!(device = %device_id, path = step.path(), error = %e, "{operation_type} failed");
                progress.add_error(OperationError::new(step.path(), e.message()));
                failed += 1;
            }
        }
    }

    info!(device = %device_id, %operation_type, succeeded, failed, "Operation finished");

    let _ = tx
        .send(OperationResult::Complete(OperationComplete {
            operation_type,
            succeeded,
            failed,
            errors: progress.errors,
        }))
        .await;
}
