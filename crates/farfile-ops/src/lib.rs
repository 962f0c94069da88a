//! Remote operation and transfer engine for farfile.
//!
//! This crate runs remote mutations (delete, rename, create directory, paste)
//! and background uploads/downloads against a [`DeviceCommands`] backend.
//! Batch operations report progress via channels; transfers are tracked in a
//! shared [`TransferTaskQueue`].
//!
//! [`DeviceCommands`]: farfile_core::DeviceCommands

mod executor;
mod local;
mod operation;
mod progress;
mod queue;
mod task;
mod transfer;

pub use executor::{OperationExecutor, OperationResult};
pub use local::LocalDevice;
pub use operation::{ClipboardOperation, OperationError, RemoteOperation, validate_filename};
pub use progress::{OperationComplete, OperationProgress, OperationType};
pub use queue::{TaskEvent, TransferTaskQueue};
pub use task::{TaskDescriptor, TaskId, TaskStatus, TaskUpdate, TransferKind, TransferTask};
pub use transfer::{TransferHandle, TransferLauncher, TransferOutcome};

/// Default channel buffer size for operation progress updates.
pub const OPERATION_CHANNEL_SIZE: usize = 100;

/// Default buffered task events per queue subscriber.
pub const TASK_EVENT_CAPACITY: usize = 256;
