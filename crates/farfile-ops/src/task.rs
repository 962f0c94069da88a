//! Transfer task types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

/// Unique identifier for a transfer task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub Uuid);

impl TaskId {
    /// Generate a fresh random id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TaskId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Direction of a transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TransferKind {
    Upload,
    Download,
}

/// Lifecycle state of a transfer task.
///
/// `Pending -> Running -> {Completed | Error}`. Terminal states never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Running,
    Completed,
    Error,
}

impl TaskStatus {
    /// Check if no further transitions are allowed.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Check if moving to `next` is a legal transition.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match (self, next) {
            (a, b) if a == b => !a.is_terminal(),
            (Self::Pending, Self::Running | Self::Error) => true,
            (Self::Running, Self::Completed | Self::Error) => true,
            _ => false,
        }
    }
}

/// A background upload or download.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferTask {
    /// Unique id.
    pub id: TaskId,
    /// Upload or download.
    pub kind: TransferKind,
    /// Display name, usually the file name.
    pub name: String,
    /// Percent complete, 0..=100.
    pub progress: u8,
    /// Current lifecycle state.
    pub status: TaskStatus,
    /// Failure message when `status` is `Error`.
    pub error: Option<String>,
    /// When the task was submitted.
    pub created_at: DateTime<Utc>,
}

impl TransferTask {
    /// Apply a partial update, returning the merged task.
    ///
    /// Returns `None` if the update would leave a terminal state or make an
    /// illegal status transition.
    pub fn merged(&self, update: &TaskUpdate) -> Option<Self> {
        if self.status.is_terminal() {
            return None;
        }
        if let Some(next) = update.status
            && next != self.status
            && !self.status.can_transition_to(next)
        {
            return None;
        }

        let mut task = self.clone();
        if let Some(status) = update.status {
            task.status = status;
        }
        if let Some(progress) = update.progress {
            task.progress = progress.min(100);
        }
        if let Some(ref error) = update.error {
            task.error = Some(error.clone());
        }
        Some(task)
    }
}

/// What the initiating action supplies to create a task.
#[derive(Debug, Clone)]
pub struct TaskDescriptor {
    /// Caller-chosen id; a fresh one is generated when absent.
    pub id: Option<TaskId>,
    /// Upload or download.
    pub kind: TransferKind,
    /// Display name.
    pub name: String,
}

impl TaskDescriptor {
    /// Describe an upload.
    pub fn upload(name: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: TransferKind::Upload,
            name: name.into(),
        }
    }

    /// Describe a download.
    pub fn download(name: impl Into<String>) -> Self {
        Self {
            id: None,
            kind: TransferKind::Download,
            name: name.into(),
        }
    }

    /// Use a specific id.
    pub fn with_id(mut self, id: TaskId) -> Self {
        self.id = Some(id);
        self
    }
}

/// Partial update merged into an existing task.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskUpdate {
    pub status: Option<TaskStatus>,
    pub progress: Option<u8>,
    pub error: Option<String>,
}

impl TaskUpdate {
    /// Mark the task completed at 100%.
    pub fn completed() -> Self {
        Self {
            status: Some(TaskStatus::Completed),
            progress: Some(100),
            error: None,
        }
    }

    /// Mark the task failed with a message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: Some(TaskStatus::Error),
            progress: None,
            error: Some(message.into()),
        }
    }

    /// Set the status only.
    pub fn status(status: TaskStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    /// Set the progress only.
    pub fn progress(progress: u8) -> Self {
        Self {
            progress: Some(progress),
            ..Default::default()
        }
    }
}
