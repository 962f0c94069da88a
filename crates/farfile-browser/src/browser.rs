//! The owned browser context.

use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexSet;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, info};

use farfile_core::path::{child_dir, parent_dir};
use farfile_core::{
    BrowserConfig, DeviceCommands, DeviceError, DirectoryListing, FileEntry, SearchMode,
};
use farfile_ops::{
    ClipboardOperation, OperationComplete, OperationExecutor, OperationType, RemoteOperation,
    TaskId, TransferKind, TransferLauncher, TransferOutcome, TransferTask, TransferTaskQueue,
};

use crate::clipboard::{ClipboardManager, ClipboardPayload};
use crate::error::BrowserError;
use crate::events::BrowserEvent;
use crate::filter::ViewFilter;
use crate::loader::{DirectoryLoader, LoadApplied, LoadResult};
use crate::navigation::NavigationHistory;
use crate::selection::SelectionModel;

/// Identifies a remote operation started by the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OperationTicket(pub u64);

/// What a background operation sends back.
#[derive(Debug)]
struct OperationReport {
    ticket: OperationTicket,
    complete: OperationComplete,
    /// The cut payload being pasted, cleared on arrival if still held.
    cut: Option<Arc<ClipboardPayload>>,
}

/// Remote file browser state for one device connection.
///
/// Created once by the application and passed around by handle. All state
/// changes happen through `&mut self`; remote calls run on spawned tokio
/// tasks and report back through channels that [`pump`](Self::pump),
/// [`settle`](Self::settle), [`next_transfer`](Self::next_transfer) and
/// [`next_operation`](Self::next_operation) drain.
/// Every observable change emits a [`BrowserEvent`] and bumps
/// [`revision`](Self::revision). Methods that start remote calls must be
/// used from within a tokio runtime.
pub struct FileBrowser {
    config: BrowserConfig,
    device: Arc<dyn DeviceCommands>,
    device_id: Option<String>,

    history: NavigationHistory,
    loader: DirectoryLoader,
    selection: SelectionModel,
    clipboard: ClipboardManager,
    filter: ViewFilter,

    transfers: TransferLauncher,
    transfers_in_flight: usize,

    load_tx: mpsc::UnboundedSender<LoadResult>,
    load_rx: mpsc::UnboundedReceiver<LoadResult>,
    transfer_rx: mpsc::UnboundedReceiver<TransferOutcome>,

    operations_issued: u64,
    operations_in_flight: usize,
    operation_tx: mpsc::UnboundedSender<OperationReport>,
    operation_rx: mpsc::UnboundedReceiver<OperationReport>,

    events: broadcast::Sender<BrowserEvent>,
    revision: u64,
}

impl std::fmt::Debug for FileBrowser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileBrowser")
            .field("device_id", &self.device_id)
            .field("current_path", &self.history.current())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

impl FileBrowser {
    /// Create a browser at the configured home path with no device selected.
    pub fn new(device: Arc<dyn DeviceCommands>, config: BrowserConfig) -> Self {
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        let (transfer_tx, transfer_rx) = mpsc::unbounded_channel();
        let (operation_tx, operation_rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(config.event_capacity.max(1));

        let queue = TransferTaskQueue::with_event_capacity(config.event_capacity.max(1));
        let transfers =
            TransferLauncher::new(Arc::clone(&device), queue).with_completions(transfer_tx);

        Self {
            history: NavigationHistory::new(config.home_path.clone()),
            loader: DirectoryLoader::new(),
            selection: SelectionModel::new(),
            clipboard: ClipboardManager::new(),
            filter: ViewFilter::new(
                config.show_hidden,
                config.search_mode,
                config.parent_sentinel.clone(),
            ),
            device,
            device_id: None,
            transfers,
            transfers_in_flight: 0,
            load_tx,
            load_rx,
            transfer_rx,
            operations_issued: 0,
            operations_in_flight: 0,
            operation_tx,
            operation_rx,
            events,
            revision: 0,
            config,
        }
    }

    // ==================== Accessors ====================

    /// The configuration this browser was created with.
    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// The selected device, if any.
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    /// The displayed path.
    pub fn current_path(&self) -> &str {
        self.history.current()
    }

    /// Navigation history.
    pub fn history(&self) -> &NavigationHistory {
        &self.history
    }

    /// Check if there is a history entry to go back to.
    pub fn can_go_back(&self) -> bool {
        self.history.can_go_back()
    }

    /// Check if there is a history entry to go forward to.
    pub fn can_go_forward(&self) -> bool {
        self.history.can_go_forward()
    }

    /// The most recently applied listing, unfiltered.
    pub fn listing(&self) -> &DirectoryListing {
        self.loader.listing()
    }

    /// Check if the latest directory load is still in flight.
    pub fn is_loading(&self) -> bool {
        self.loader.is_loading()
    }

    /// Message of the last failed load.
    pub fn error(&self) -> Option<&str> {
        self.loader.error()
    }

    /// Entries that pass the hidden-file and search filters, in listing order.
    pub fn visible_entries(&self) -> Vec<&FileEntry> {
        self.filter.visible(self.loader.listing())
    }

    /// The selection.
    pub fn selection(&self) -> &SelectionModel {
        &self.selection
    }

    /// Listing entries whose names are selected, in listing order.
    ///
    /// Selected names hidden by a filter are included.
    pub fn selected_entries(&self) -> Vec<FileEntry> {
        self.loader
            .listing()
            .iter()
            .filter(|e| !self.filter.is_sentinel(e) && self.selection.contains(&e.name))
            .cloned()
            .collect()
    }

    /// The clipboard.
    pub fn clipboard(&self) -> &ClipboardManager {
        &self.clipboard
    }

    /// The view filter.
    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    /// Transfer tasks, newest first.
    pub fn tasks(&self) -> Vec<TransferTask> {
        self.transfers.queue().tasks()
    }

    /// The transfer queue, for subscribing to task events.
    pub fn task_queue(&self) -> &TransferTaskQueue {
        self.transfers.queue()
    }

    /// Subscribe to change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<BrowserEvent> {
        self.events.subscribe()
    }

    /// Counter bumped on every change, for pollers.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn emit(&mut self, event: BrowserEvent) {
        self.revision += 1;
        debug!(revision = self.revision, ?event, "Browser state changed");
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    fn require_device(&self) -> Result<String, BrowserError> {
        self.device_id.clone().ok_or(BrowserError::NoDevice)
    }

    fn entry(&self, name: &str) -> Result<FileEntry, BrowserError> {
        self.loader
            .listing()
            .get(name)
            .cloned()
            .ok_or_else(|| BrowserError::UnknownEntry {
                name: name.to_string(),
            })
    }

    // ==================== Device and loading ====================

    /// Switch to another device, or to none.
    ///
    /// Drops the listing and any in-flight load, then reloads the current
    /// path on the new device.
    pub fn select_device(&mut self, device_id: Option<String>) {
        if self.device_id == device_id {
            return;
        }

        info!(device = ?device_id, "Device selected");
        self.device_id = device_id.clone();
        let path = self.history.current().to_string();
        self.loader.reset(path);
        self.set_selection_cleared();
        self.emit(BrowserEvent::DeviceChanged { device_id });
        self.refresh();
    }

    /// Reload the displayed directory in the background.
    ///
    /// Returns `false` when no device is selected. Any load already in flight
    /// is superseded; its result will be discarded.
    pub fn refresh(&mut self) -> bool {
        let Some(device_id) = self.device_id.clone() else {
            debug!("No device selected, skipping directory load");
            return false;
        };

        let request = self.loader.begin(device_id, self.history.current());
        let token = request.token;
        let path = request.path.clone();
        let device = Arc::clone(&self.device);
        let tx = self.load_tx.clone();

        let fetch_path = path.clone();
        tokio::spawn(async move {
            let fetch = tokio::spawn(async move { request.fetch(device.as_ref()).await });
            let result = match fetch.await {
                Ok(result) => result,
                Err(e) => LoadResult {
                    token,
                    path: fetch_path,
                    result: Err(DeviceError::failed(format!("Directory load failed: {e}"))),
                },
            };
            let _ = tx.send(result);
        });

        self.emit(BrowserEvent::LoadStarted { path });
        true
    }

    /// Apply every load, transfer and operation result already delivered,
    /// without waiting.
    ///
    /// Returns the number of results processed.
    pub fn pump(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(result) = self.load_rx.try_recv() {
            self.apply_load(result);
            processed += 1;
        }
        while let Ok(outcome) = self.transfer_rx.try_recv() {
            self.apply_transfer(outcome);
            processed += 1;
        }
        while let Ok(report) = self.operation_rx.try_recv() {
            self.apply_operation(report);
            processed += 1;
        }
        processed
    }

    /// Wait for the next load result and apply it.
    ///
    /// Returns `None` when no load is in flight.
    pub async fn next_load(&mut self) -> Option<LoadApplied> {
        if !self.loader.is_loading() {
            return None;
        }
        let result = self.load_rx.recv().await?;
        Some(self.apply_load(result))
    }

    /// Wait until the latest load has settled, applying results as they arrive.
    ///
    /// Already-delivered transfer outcomes are applied too, which may start a
    /// reload that this call then also waits for.
    pub async fn settle(&mut self) {
        loop {
            self.pump();
            if !self.loader.is_loading() {
                return;
            }
            if self.next_load().await.is_none() {
                return;
            }
        }
    }

    fn apply_load(&mut self, result: LoadResult) -> LoadApplied {
        let applied = self.loader.apply(result);
        match &applied {
            LoadApplied::Loaded { path, entries } => {
                self.set_selection_cleared();
                self.emit(BrowserEvent::ListingLoaded {
                    path: path.clone(),
                    entries: *entries,
                });
            }
            LoadApplied::Failed { path, message } => {
                self.set_selection_cleared();
                self.emit(BrowserEvent::LoadFailed {
                    path: path.clone(),
                    message: message.clone(),
                });
            }
            LoadApplied::Stale { .. } => {}
        }
        applied
    }

    // ==================== Navigation ====================

    /// Display `path`, used as given (directory paths end in `/`).
    ///
    /// Returns `false` if `path` is already displayed.
    pub fn navigate_to(&mut self, path: impl Into<String>) -> bool {
        let moved = self.history.navigate_to(path);
        if moved {
            self.on_path_changed();
        }
        moved
    }

    /// Go back one history entry.
    pub fn navigate_back(&mut self) -> bool {
        let moved = self.history.back();
        if moved {
            self.on_path_changed();
        }
        moved
    }

    /// Go forward one history entry.
    pub fn navigate_forward(&mut self) -> bool {
        let moved = self.history.forward();
        if moved {
            self.on_path_changed();
        }
        moved
    }

    /// Display the parent directory. No-op at root.
    pub fn navigate_up(&mut self) -> bool {
        let moved = self.history.up();
        if moved {
            self.on_path_changed();
        }
        moved
    }

    /// Enter a directory entry of the current listing.
    ///
    /// The parent sentinel navigates up.
    pub fn open(&mut self, name: &str) -> Result<bool, BrowserError> {
        if name == self.filter.parent_sentinel() {
            return Ok(self.navigate_up());
        }
        let entry = self.entry(name)?;
        if !entry.is_dir {
            return Ok(false);
        }
        let target = child_dir(self.history.current(), &entry.name);
        Ok(self.navigate_to(target))
    }

    fn on_path_changed(&mut self) {
        let path = self.history.current().to_string();
        debug!(%path, index = self.history.index(), "Navigated");

        self.set_selection_cleared();
        if !self.filter.query().is_empty() {
            self.filter.clear_query();
            self.emit(BrowserEvent::FilterChanged);
        }
        self.emit(BrowserEvent::PathChanged { path });
        self.refresh();
    }

    // ==================== Selection ====================

    /// Flip selection of `name`.
    pub fn toggle_selection(&mut self, name: &str) {
        self.selection.toggle(name);
        self.emit_selection();
    }

    /// Select every entry of the listing except the parent sentinel.
    pub fn select_all(&mut self) {
        let names: Vec<&str> = self
            .loader
            .listing()
            .iter()
            .filter(|e| !self.filter.is_sentinel(e))
            .map(|e| e.name.as_str())
            .collect();
        self.selection.select_all(names);
        self.emit_selection();
    }

    /// Empty the selection.
    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.emit_selection();
    }

    /// Add the inclusive span between two names, in displayed order.
    ///
    /// Returns `false` if either name is not displayed.
    pub fn select_range(&mut self, from: &str, to: &str) -> bool {
        let order: Vec<&str> = self
            .filter
            .visible(self.loader.listing())
            .into_iter()
            .map(|e| e.name.as_str())
            .collect();
        if !self.selection.select_range(&order, from, to) {
            return false;
        }
        self.emit_selection();
        true
    }

    /// Snapshot of the selected names.
    pub fn selected_names(&self) -> Arc<IndexSet<String>> {
        self.selection.snapshot()
    }

    fn set_selection_cleared(&mut self) {
        if !self.selection.is_empty() {
            self.selection.clear();
            self.emit_selection();
        }
    }

    fn emit_selection(&mut self) {
        let selected = self.selection.len();
        self.emit(BrowserEvent::SelectionChanged { selected });
    }

    // ==================== Clipboard ====================

    /// Put the selected entries on the clipboard for copying.
    ///
    /// Returns `false`, leaving the clipboard untouched, if nothing is selected.
    pub fn copy_to_clipboard(&mut self) -> bool {
        self.fill_clipboard(ClipboardOperation::Copy)
    }

    /// Put the selected entries on the clipboard for moving.
    pub fn cut_to_clipboard(&mut self) -> bool {
        self.fill_clipboard(ClipboardOperation::Cut)
    }

    /// Empty the clipboard.
    pub fn clear_clipboard(&mut self) {
        if self.clipboard.is_empty() {
            return;
        }
        self.clipboard.clear();
        self.emit_clipboard();
    }

    /// Whether `name` should be drawn as pending a move in the displayed directory.
    pub fn is_cut_file(&self, name: &str) -> bool {
        self.clipboard.is_cut_file(name, self.history.current())
    }

    fn fill_clipboard(&mut self, operation: ClipboardOperation) -> bool {
        let entries = self.selected_entries();
        if entries.is_empty() {
            return false;
        }
        let source = self.history.current().to_string();
        self.clipboard.set(operation, source, entries);
        self.emit_clipboard();
        true
    }

    fn emit_clipboard(&mut self) {
        let operation = self.clipboard.operation();
        let entries = self.clipboard.len();
        self.emit(BrowserEvent::ClipboardChanged { operation, entries });
    }

    // ==================== Filtering ====================

    /// Replace the search text. The selection is untouched.
    pub fn set_search(&mut self, query: impl Into<String>) {
        self.filter.set_query(query);
        self.emit(BrowserEvent::FilterChanged);
    }

    /// Switch between substring and glob search.
    pub fn set_search_mode(&mut self, mode: SearchMode) {
        self.filter.set_mode(mode);
        self.emit(BrowserEvent::FilterChanged);
    }

    /// Show or hide dot-files. The selection is untouched.
    pub fn set_show_hidden(&mut self, show: bool) {
        if self.filter.show_hidden() == show {
            return;
        }
        self.filter.set_show_hidden(show);
        self.emit(BrowserEvent::FilterChanged);
    }

    // ==================== Transfers ====================

    /// Upload local files into the displayed directory, one task per file.
    ///
    /// Every upload starts immediately. When an upload succeeds while its
    /// target directory is still displayed, the listing is reloaded.
    pub fn upload_files(
        &mut self,
        local_paths: impl IntoIterator<Item = PathBuf>,
    ) -> Result<Vec<TaskId>, BrowserError> {
        let device_id = self.require_device()?;
        let remote_dir = self.history.current().to_string();

        let ids: Vec<TaskId> = local_paths
            .into_iter()
            .map(|local| self.transfers.upload(&device_id, local, &remote_dir).id)
            .collect();
        self.transfers_in_flight += ids.len();
        info!(count = ids.len(), dir = %remote_dir, "Uploads started");
        Ok(ids)
    }

    /// Download an entry of the displayed directory to a local destination.
    pub fn download(&mut self, name: &str, destination: PathBuf) -> Result<TaskId, BrowserError> {
        let device_id = self.require_device()?;
        let entry = self.entry(name)?;

        let handle = self.transfers.download(&device_id, &entry.path, destination);
        self.transfers_in_flight += 1;
        Ok(handle.id)
    }

    /// Wait for the next transfer to settle and apply it.
    ///
    /// Returns `None` when no transfer is in flight.
    pub async fn next_transfer(&mut self) -> Option<TransferOutcome> {
        if self.transfers_in_flight == 0 {
            return None;
        }
        let outcome = self.transfer_rx.recv().await?;
        self.apply_transfer(outcome.clone());
        Some(outcome)
    }

    /// Drop one task from the queue regardless of its state.
    pub fn remove_task(&mut self, id: TaskId) -> bool {
        self.transfers.queue().remove_task(id)
    }

    /// Drop every completed or failed task.
    pub fn clear_completed(&mut self) -> usize {
        self.transfers.queue().clear_completed()
    }

    fn apply_transfer(&mut self, outcome: TransferOutcome) {
        self.transfers_in_flight = self.transfers_in_flight.saturating_sub(1);
        let success = outcome.is_success();
        self.emit(BrowserEvent::TransferSettled {
            id: outcome.id,
            success,
        });

        if success
            && outcome.kind == TransferKind::Upload
            && parent_dir(&outcome.remote_path).as_deref() == Some(self.history.current())
        {
            debug!(path = %outcome.remote_path, "Upload landed in displayed directory");
            self.refresh();
        }
    }

    // ==================== Remote mutations ====================

    /// Start deleting the selected entries.
    ///
    /// The selection is cleared and the directory reloaded once the
    /// operation reports back through [`pump`](Self::pump) or
    /// [`next_operation`](Self::next_operation).
    pub fn start_delete_selected(&mut self) -> Result<OperationTicket, BrowserError> {
        let targets: Vec<String> = self.selected_entries().into_iter().map(|e| e.path).collect();
        self.start_operation(RemoteOperation::delete(targets), None)
    }

    /// Start renaming an entry of the displayed directory.
    pub fn start_rename(
        &mut self,
        name: &str,
        new_name: impl Into<String>,
    ) -> Result<OperationTicket, BrowserError> {
        let entry = self.entry(name)?;
        self.start_operation(
            RemoteOperation::Rename {
                source: entry.path,
                new_name: new_name.into(),
            },
            None,
        )
    }

    /// Start creating a directory in the displayed directory.
    pub fn start_create_directory(
        &mut self,
        name: impl Into<String>,
    ) -> Result<OperationTicket, BrowserError> {
        let parent = self.history.current().to_string();
        self.start_operation(
            RemoteOperation::CreateDirectory {
                parent,
                name: name.into(),
            },
            None,
        )
    }

    /// Start pasting the clipboard into the displayed directory.
    ///
    /// A cut payload is cleared when the move reports back, whatever its
    /// outcome, unless the clipboard has been refilled in the meantime.
    pub fn start_paste(&mut self) -> Result<OperationTicket, BrowserError> {
        let payload: Arc<ClipboardPayload> =
            self.clipboard.payload().ok_or(BrowserError::EmptyClipboard)?;
        let destination = self.history.current().to_string();
        let cut = (payload.operation == ClipboardOperation::Cut).then(|| Arc::clone(&payload));

        self.start_operation(
            RemoteOperation::Paste {
                operation: payload.operation,
                sources: payload.entries.clone(),
                destination,
            },
            cut,
        )
    }

    /// Delete the selected entries and wait for the result.
    pub async fn delete_selected(&mut self) -> Result<OperationComplete, BrowserError> {
        let ticket = self.start_delete_selected()?;
        self.finish_operation(ticket).await
    }

    /// Rename an entry of the displayed directory and wait for the result.
    pub async fn rename(
        &mut self,
        name: &str,
        new_name: impl Into<String>,
    ) -> Result<OperationComplete, BrowserError> {
        let ticket = self.start_rename(name, new_name)?;
        self.finish_operation(ticket).await
    }

    /// Create a directory in the displayed directory and wait for the result.
    pub async fn create_directory(
        &mut self,
        name: impl Into<String>,
    ) -> Result<OperationComplete, BrowserError> {
        let ticket = self.start_create_directory(name)?;
        self.finish_operation(ticket).await
    }

    /// Paste the clipboard into the displayed directory and wait for the result.
    pub async fn paste(&mut self) -> Result<OperationComplete, BrowserError> {
        let ticket = self.start_paste()?;
        self.finish_operation(ticket).await
    }

    /// Check if any remote operation has not reported back yet.
    pub fn has_pending_operations(&self) -> bool {
        self.operations_in_flight > 0
    }

    /// Wait for the next remote operation to finish and apply it.
    ///
    /// Returns `None` when no operation is in flight.
    pub async fn next_operation(&mut self) -> Option<(OperationTicket, OperationComplete)> {
        if self.operations_in_flight == 0 {
            return None;
        }
        let report = self.operation_rx.recv().await?;
        Some(self.apply_operation(report))
    }

    fn start_operation(
        &mut self,
        operation: RemoteOperation,
        cut: Option<Arc<ClipboardPayload>>,
    ) -> Result<OperationTicket, BrowserError> {
        let device_id = self.require_device()?;
        self.operations_issued += 1;
        let ticket = OperationTicket(self.operations_issued);
        self.operations_in_flight += 1;

        let executor = OperationExecutor::new(Arc::clone(&self.device), device_id);
        let tx = self.operation_tx.clone();
        tokio::spawn(async move {
            let complete = executor.run(operation).await;
            let _ = tx.send(OperationReport {
                ticket,
                complete,
                cut,
            });
        });

        debug!(ticket = ticket.0, "Remote operation started");
        Ok(ticket)
    }

    async fn finish_operation(
        &mut self,
        ticket: OperationTicket,
    ) -> Result<OperationComplete, BrowserError> {
        while let Some((finished, complete)) = self.next_operation().await {
            if finished == ticket {
                return Ok(complete);
            }
        }
        Err(BrowserError::OperationLost)
    }

    fn apply_operation(&mut self, report: OperationReport) -> (OperationTicket, OperationComplete) {
        self.operations_in_flight = self.operations_in_flight.saturating_sub(1);
        let OperationReport {
            ticket,
            complete,
            cut,
        } = report;

        info!(ticket = ticket.0, summary = %complete.summary(), "Remote operation finished");
        self.emit(BrowserEvent::OperationFinished {
            operation_type: complete.operation_type,
            succeeded: complete.succeeded,
            failed: complete.failed,
        });

        if complete.operation_type == OperationType::Delete {
            self.set_selection_cleared();
        }
        if let Some(payload) = cut
            && self
                .clipboard
                .payload()
                .is_some_and(|current| Arc::ptr_eq(&current, &payload))
        {
            self.clear_clipboard();
        }

        self.refresh();
        (ticket, complete)
    }

    // ==================== Preview ====================

    /// Read a file of the displayed directory for preview.
    ///
    /// Directories and files larger than the configured preview limit are
    /// refused without contacting the device.
    pub async fn read_file(&self, name: &str) -> Result<Vec<u8>, BrowserError> {
        let device_id = self.require_device()?;
        let entry = self.entry(name)?;
        if entry.is_dir {
            return Err(BrowserError::IsDirectory {
                name: name.to_string(),
            });
        }

        let limit = self.config.preview_limit;
        if let Some(size) = entry.size
            && size > limit
        {
            return Err(BrowserError::TooLarge {
                name: name.to_string(),
                size,
                limit,
            });
        }

        Ok(self.device.read_file_bytes(&device_id, &entry.path).await?)
    }
}
