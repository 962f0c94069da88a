//! Shared queue of background transfer tasks.

use std::sync::Arc;

use chrono::Utc;
use indexmap::IndexMap;
use parking_lot::RwLock;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::TASK_EVENT_CAPACITY;
use crate::task::{TaskDescriptor, TaskId, TaskStatus, TaskUpdate, TransferTask};

/// Change notification emitted by a [`TransferTaskQueue`].
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEvent {
    /// A task was submitted.
    Added(TransferTask),
    /// A task changed; carries the new value.
    Updated(TransferTask),
    /// A single task was removed.
    Removed(TaskId),
    /// Finished tasks were cleared.
    Cleared { removed: usize },
}

#[derive(Debug)]
struct QueueInner {
    /// Tasks in submission order.
    tasks: RwLock<IndexMap<TaskId, TransferTask>>,
    events: broadcast::Sender<TaskEvent>,
}

/// Unbounded queue of upload/download tasks.
///
/// Cloning yields another handle to the same queue. Every submitted task
/// starts running immediately; there is no concurrency cap. Each mutation
/// replaces a task value wholesale, so readers never observe a partially
/// merged task.
#[derive(Debug, Clone)]
pub struct TransferTaskQueue {
    inner: Arc<QueueInner>,
}

impl Default for TransferTaskQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl TransferTaskQueue {
    /// Create an empty queue.
    pub fn new() -> Self {
        Self::with_event_capacity(TASK_EVENT_CAPACITY)
    }

    /// Create an empty queue with a custom event buffer size.
    pub fn with_event_capacity(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity.max(1));
        Self {
            inner: Arc::new(QueueInner {
                tasks: RwLock::new(IndexMap::new()),
                events,
            }),
        }
    }

    /// Subscribe to task change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<TaskEvent> {
        self.inner.events.subscribe()
    }

    /// Submit a task. It is `Running` as soon as this returns.
    pub fn add_task(&self, descriptor: TaskDescriptor) -> TaskId {
        let id = descriptor.id.unwrap_or_default();
        let task = TransferTask {
            id,
            kind: descriptor.kind,
            name: descriptor.name,
            progress: 0,
            status: TaskStatus::Running,
            error: None,
            created_at: Utc::now(),
        };

        {
            let mut tasks = self.inner.tasks.write();
            if tasks.shift_remove(&id).is_some() {
                debug!(%id, "Replacing task with reused id");
            }
            tasks.insert(id, task.clone());
        }

        debug!(%id, kind = %task.kind, name = %task.name, "Task added");
        self.emit(TaskEvent::Added(task));
        id
    }

    /// Merge a partial update into a task.
    ///
    /// Unknown ids are ignored. Updates to finished tasks, and illegal
    /// status transitions, are rejected. Returns whether the task changed.
    pub fn update_task(&self, id: TaskId, update: TaskUpdate) -> bool {
        let merged = {
            let mut tasks = self.inner.tasks.write();
            let Some(current) = tasks.get(&id) else {
                return false;
            };
            let Some(merged) = current.merged(&update) else {
                warn!(%id, status = %current.status, ?update, "Rejected task update");
                return false;
            };
            tasks.insert(id, merged.clone());
            merged
        };

        debug!(%id, status = %merged.status, progress = merged.progress, "Task updated");
        self.emit(TaskEvent::Updated(merged));
        true
    }

    /// Remove a single task regardless of its state.
    pub fn remove_task(&self, id: TaskId) -> bool {
        let removed = self.inner.tasks.write().shift_remove(&id).is_some();
        if removed {
            self.emit(TaskEvent::Removed(id));
        }
        removed
    }

    /// Discard every completed or failed task, keeping pending and running ones.
    ///
    /// Returns the number of tasks removed.
    pub fn clear_completed(&self) -> usize {
        let removed = {
            let mut tasks = self.inner.tasks.write();
            let before = tasks.len();
            tasks.retain(|_, task| !task.status.is_terminal());
            before - tasks.len()
        };

        if removed > 0 {
            debug!(removed, "Cleared finished tasks");
            self.emit(TaskEvent::Cleared { removed });
        }
        removed
    }

    /// Snapshot of all tasks, newest first.
    pub fn tasks(&self) -> Vec<TransferTask> {
        self.inner.tasks.read().values().rev().cloned().collect()
    }

    /// Snapshot of one task.
    pub fn get(&self, id: TaskId) -> Option<TransferTask> {
        self.inner.tasks.read().get(&id).cloned()
    }

    /// Number of tasks still pending or running.
    pub fn active_count(&self) -> usize {
        self.inner
            .tasks
            .read()
            .values()
            .filter(|t| !t.status.is_terminal())
            .count()
    }

    /// Total number of tracked tasks.
    pub fn len(&self) -> usize {
        self.inner.tasks.read().len()
    }

    /// Check if no tasks are tracked.
    pub fn is_empty(&self) -> bool {
        self.inner.tasks.read().is_empty()
    }

    fn emit(&self, event: TaskEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }
}
