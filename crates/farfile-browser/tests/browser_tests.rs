use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Semaphore;

use farfile_browser::{BrowserError, BrowserEvent, FileBrowser};
use farfile_core::{BrowserConfig, DeviceCommands, DeviceError, DeviceResult, FileEntry};
use farfile_ops::{ClipboardOperation, LocalDevice, TaskStatus};

const DEVICE: &str = "emulator-5554";

/// In-memory device whose listings can be changed and held back per path.
#[derive(Default)]
struct ScriptedDevice {
    dirs: Mutex<HashMap<String, DeviceResult<Vec<FileEntry>>>>,
    gates: Mutex<HashMap<String, Arc<Semaphore>>>,
}

impl ScriptedDevice {
    fn with_dir(self, path: &str, names: &[&str]) -> Self {
        self.set_dir(path, Ok(entries(path, names)));
        self
    }

    fn set_dir(&self, path: &str, result: DeviceResult<Vec<FileEntry>>) {
        self.dirs.lock().unwrap().insert(path.to_string(), result);
    }

    /// Hold every call on `path` until a permit is added.
    fn gate(&self, path: &str) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        self.gates
            .lock()
            .unwrap()
            .insert(path.to_string(), Arc::clone(&gate));
        gate
    }

    async fn pass_gate(&self, path: &str) {
        let gate = self.gates.lock().unwrap().get(path).cloned();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }
    }
}

/// Directories are names ending in `/`.
fn entries(dir: &str, names: &[&str]) -> Vec<FileEntry> {
    names
        .iter()
        .map(|n| match n.strip_suffix('/') {
            Some(d) if d == ".." => FileEntry::directory("..", "/"),
            Some(d) => FileEntry::directory(d, format!("{dir}{d}")),
            None => FileEntry::file(*n, format!("{dir}{n}"), 10),
        })
        .collect()
}

#[async_trait]
impl DeviceCommands for ScriptedDevice {
    async fn list_directory(&self, _device_id: &str, path: &str) -> DeviceResult<Vec<FileEntry>> {
        self.pass_gate(path).await;
        self.dirs
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .unwrap_or_else(|| Err(DeviceError::failed("no such directory")))
    }

    async fn delete_entry(&self, _device_id: &str, _path: &str) -> DeviceResult<()> {
        Ok(())
    }

    async fn rename_entry(&self, _: &str, old_path: &str, _: &str) -> DeviceResult<()> {
        self.pass_gate(old_path).await;
        Ok(())
    }

    async fn create_directory(&self, _device_id: &str, path: &str) -> DeviceResult<()> {
        self.pass_gate(path).await;
        Ok(())
    }

    async fn read_file_bytes(&self, _device_id: &str, _path: &str) -> DeviceResult<Vec<u8>> {
        Ok(b"hello".to_vec())
    }

    async fn upload_file(&self, _: &str, _: &Path, _: &str) -> DeviceResult<()> {
        Ok(())
    }

    async fn download_file(&self, _: &str, _: &str, _: &Path) -> DeviceResult<()> {
        Ok(())
    }
}

/// Device that panics when listing anything under `/broken/` or uploading.
struct PanickingDevice;

#[async_trait]
impl DeviceCommands for PanickingDevice {
    async fn list_directory(&self, _device_id: &str, path: &str) -> DeviceResult<Vec<FileEntry>> {
        if path.starts_with("/broken/") {
            panic!("device connection dropped");
        }
        Ok(entries(path, &["a.txt"]))
    }

    async fn delete_entry(&self, _device_id: &str, _path: &str) -> DeviceResult<()> {
        Ok(())
    }

    async fn rename_entry(&self, _: &str, _: &str, _: &str) -> DeviceResult<()> {
        Ok(())
    }

    async fn create_directory(&self, _device_id: &str, _path: &str) -> DeviceResult<()> {
        Ok(())
    }

    async fn read_file_bytes(&self, _device_id: &str, _path: &str) -> DeviceResult<Vec<u8>> {
        Ok(Vec::new())
    }

    async fn upload_file(&self, _: &str, _: &Path, _: &str) -> DeviceResult<()> {
        panic!("device connection dropped");
    }

    async fn download_file(&self, _: &str, _: &str, _: &Path) -> DeviceResult<()> {
        Ok(())
    }
}

fn scripted() -> Arc<ScriptedDevice> {
    Arc::new(
        ScriptedDevice::default()
            .with_dir("/sdcard/", &["../", "Download/", "a.txt", "b.txt", "c.txt", ".nomedia"])
            .with_dir("/sdcard/Download/", &["../", "song.mp3"])
            .with_dir("/sdcard/A/", &["a1.txt", "a2.txt"])
            .with_dir("/sdcard/B/", &["b1.txt"]),
    )
}

async fn browser_on(device: Arc<dyn DeviceCommands>) -> FileBrowser {
    let mut browser = FileBrowser::new(device, BrowserConfig::default());
    browser.select_device(Some(DEVICE.to_string()));
    browser.settle().await;
    browser
}

fn names(browser: &FileBrowser) -> Vec<String> {
    browser
        .listing()
        .iter()
        .map(|e| e.name.to_string())
        .collect()
}

/// Wait until some background result has been applied.
async fn pump_until_applied(browser: &mut FileBrowser) {
    for _ in 0..200 {
        if browser.pump() > 0 {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("no background result arrived");
}

#[tokio::test]
async fn test_no_device_skips_loading() {
    let mut browser = FileBrowser::new(scripted(), BrowserConfig::default());
    assert!(!browser.refresh());
    assert!(!browser.is_loading());
    assert!(browser.navigate_to("/sdcard/A/"));
    assert!(browser.listing().is_empty());

    assert_eq!(
        browser.upload_files(vec!["/tmp/x".into()]),
        Err(BrowserError::NoDevice)
    );
}

#[tokio::test]
async fn test_initial_load_sorts_listing() {
    let browser = browser_on(scripted()).await;
    assert_eq!(browser.current_path(), "/sdcard/");
    assert_eq!(
        names(&browser),
        vec!["..", "Download", ".nomedia", "a.txt", "b.txt", "c.txt"]
    );
    assert!(!browser.is_loading());
    assert_eq!(browser.error(), None);
}

#[tokio::test]
async fn test_stale_listing_is_discarded() {
    let device = scripted();
    let gate_a = device.gate("/sdcard/A/");
    let mut browser = browser_on(device.clone()).await;

    browser.navigate_to("/sdcard/A/");
    browser.navigate_to("/sdcard/B/");
    browser.settle().await;
    assert_eq!(browser.listing().path, "/sdcard/B/");
    assert_eq!(names(&browser), vec!["b1.txt"]);

    // A answers after B; it must not replace the listing.
    gate_a.add_permits(1);
    pump_until_applied(&mut browser).await;
    assert_eq!(browser.current_path(), "/sdcard/B/");
    assert_eq!(browser.listing().path, "/sdcard/B/");
    assert_eq!(names(&browser), vec!["b1.txt"]);
    assert!(!browser.is_loading());
}

#[tokio::test]
async fn test_loading_until_latest_request_settles() {
    let device = scripted();
    let gate_a = device.gate("/sdcard/A/");
    let gate_b = device.gate("/sdcard/B/");
    let mut browser = browser_on(device.clone()).await;

    browser.navigate_to("/sdcard/A/");
    browser.navigate_to("/sdcard/B/");
    gate_a.add_permits(1);
    pump_until_applied(&mut browser).await;
    assert!(browser.is_loading());
    assert_ne!(browser.listing().path, "/sdcard/A/");

    gate_b.add_permits(1);
    browser.settle().await;
    assert!(!browser.is_loading());
    assert_eq!(names(&browser), vec!["b1.txt"]);
}

#[tokio::test]
async fn test_back_and_forward_reload() {
    let mut browser = browser_on(scripted()).await;
    browser.navigate_to("/sdcard/A/");
    browser.navigate_to("/sdcard/B/");

    assert!(browser.navigate_back());
    browser.settle().await;
    assert_eq!(browser.current_path(), "/sdcard/A/");
    assert_eq!(names(&browser), vec!["a1.txt", "a2.txt"]);

    assert!(browser.navigate_forward());
    browser.settle().await;
    assert_eq!(browser.current_path(), "/sdcard/B/");
    assert!(!browser.navigate_forward());
    assert!(browser.history().index() < browser.history().len());
}

#[tokio::test]
async fn test_open_and_navigate_up() {
    let mut browser = browser_on(scripted()).await;

    assert_eq!(browser.open("Download"), Ok(true));
    browser.settle().await;
    assert_eq!(browser.current_path(), "/sdcard/Download/");
    assert_eq!(browser.open("song.mp3"), Ok(false));

    assert_eq!(browser.open(".."), Ok(true));
    browser.settle().await;
    assert_eq!(browser.current_path(), "/sdcard/");
    assert!(matches!(
        browser.open("missing"),
        Err(BrowserError::UnknownEntry { .. })
    ));
}

#[tokio::test]
async fn test_navigation_clears_selection_and_search() {
    let mut browser = browser_on(scripted()).await;
    browser.toggle_selection("a.txt");
    browser.set_search("a");

    browser.navigate_to("/sdcard/Download/");
    assert!(browser.selection().is_empty());
    assert_eq!(browser.filter().query(), "");
}

#[tokio::test]
async fn test_reload_clears_selection() {
    let mut browser = browser_on(scripted()).await;
    browser.toggle_selection("a.txt");
    browser.refresh();
    browser.settle().await;
    assert!(browser.selection().is_empty());
}

#[tokio::test]
async fn test_select_all_excludes_sentinel() {
    let mut browser = browser_on(scripted()).await;
    browser.toggle_selection("stale");
    browser.select_all();

    let selected = browser.selected_names();
    assert_eq!(selected.len(), 5);
    assert!(!selected.contains(".."));
    assert!(!selected.contains("stale"));

    browser.clear_selection();
    assert!(browser.selection().is_empty());
}

#[tokio::test]
async fn test_toggle_twice_restores_selection() {
    let mut browser = browser_on(scripted()).await;
    browser.toggle_selection("b.txt");
    let before = browser.selected_names();

    browser.toggle_selection("a.txt");
    browser.toggle_selection("a.txt");
    assert_eq!(*browser.selected_names(), *before);
}

#[tokio::test]
async fn test_select_range_in_displayed_order() {
    let mut browser = browser_on(scripted()).await;
    browser.set_show_hidden(false);

    assert!(browser.select_range("a.txt", "c.txt"));
    let mut selected: Vec<_> = browser.selection().iter().map(str::to_string).collect();
    selected.sort();
    assert_eq!(selected, vec!["a.txt", "b.txt", "c.txt"]);

    assert!(!browser.select_range("..", "a.txt"));
    assert!(!browser.select_range("a.txt", ".nomedia"));
}

#[tokio::test]
async fn test_filtering_keeps_hidden_selection() {
    let mut browser = browser_on(scripted()).await;
    browser.toggle_selection(".nomedia");
    browser.set_show_hidden(false);

    let visible: Vec<_> = browser
        .visible_entries()
        .iter()
        .map(|e| e.name.to_string())
        .collect();
    assert_eq!(visible, vec!["Download", "a.txt", "b.txt", "c.txt"]);
    assert!(browser.selection().contains(".nomedia"));

    browser.set_search("b.");
    assert_eq!(browser.visible_entries().len(), 1);
    assert!(browser.selection().contains(".nomedia"));
}

#[tokio::test]
async fn test_cut_ghost_follows_source_directory() {
    let mut browser = browser_on(scripted()).await;
    browser.toggle_selection("a.txt");
    assert!(browser.cut_to_clipboard());
    assert!(browser.is_cut_file("a.txt"));
    assert!(!browser.is_cut_file("b.txt"));

    browser.navigate_to("/sdcard/Download/");
    assert!(!browser.is_cut_file("a.txt"));
    assert_eq!(browser.clipboard().len(), 1);

    browser.navigate_back();
    assert!(browser.is_cut_file("a.txt"));
}

#[tokio::test]
async fn test_clipboard_snapshots_full_entries() {
    let mut browser = browser_on(scripted()).await;
    assert!(!browser.copy_to_clipboard());
    assert!(browser.clipboard().is_empty());

    browser.select_range("a.txt", "b.txt");
    assert!(browser.copy_to_clipboard());

    let payload = browser.clipboard().payload().unwrap();
    assert_eq!(payload.operation, ClipboardOperation::Copy);
    assert_eq!(payload.source_path, "/sdcard/");
    assert_eq!(payload.entries[0].path, "/sdcard/a.txt");
    assert_eq!(payload.entries[1].size, Some(10));

    browser.clear_clipboard();
    assert!(browser.clipboard().is_empty());
}

#[tokio::test]
async fn test_failed_load_then_recovery() {
    let device = scripted();
    device.set_dir("/data/", Err(DeviceError::failed("permission denied")));
    let mut browser = browser_on(device.clone()).await;

    browser.navigate_to("/data/");
    browser.settle().await;
    assert!(browser.listing().is_empty());
    assert_eq!(browser.error(), Some("permission denied"));
    assert!(!browser.is_loading());

    device.set_dir("/data/", Ok(entries("/data/", &["local/"])));
    browser.refresh();
    assert_eq!(browser.error(), None);
    browser.settle().await;
    assert_eq!(browser.error(), None);
    assert_eq!(names(&browser), vec!["local"]);
}

#[tokio::test]
async fn test_events_and_revision() {
    let mut browser = browser_on(scripted()).await;
    let mut events = browser.subscribe();
    let revision = browser.revision();

    browser.navigate_to("/sdcard/B/");
    browser.settle().await;

    assert_eq!(
        events.recv().await.unwrap(),
        BrowserEvent::PathChanged {
            path: "/sdcard/B/".into()
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        BrowserEvent::LoadStarted {
            path: "/sdcard/B/".into()
        }
    );
    assert_eq!(
        events.recv().await.unwrap(),
        BrowserEvent::ListingLoaded {
            path: "/sdcard/B/".into(),
            entries: 1
        }
    );
    assert_eq!(browser.revision(), revision + 3);
}

#[tokio::test]
async fn test_read_file_limits() {
    let config = BrowserConfig::builder().preview_limit(5u64).build().unwrap();
    let mut browser = FileBrowser::new(scripted(), config);
    browser.select_device(Some(DEVICE.to_string()));
    browser.settle().await;

    assert!(matches!(
        browser.read_file("a.txt").await,
        Err(BrowserError::TooLarge { size: 10, limit: 5, .. })
    ));
    assert!(matches!(
        browser.read_file("Download").await,
        Err(BrowserError::IsDirectory { .. })
    ));

    let browser = browser_on(scripted()).await;
    assert_eq!(browser.read_file("a.txt").await.unwrap(), b"hello");
}

// ==================== LocalDevice-backed flows ====================

fn local_tree() -> (tempfile::TempDir, Arc<LocalDevice>) {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sdcard/Download")).unwrap();
    fs::write(dir.path().join("sdcard/a.txt"), b"alpha").unwrap();
    fs::write(dir.path().join("sdcard/b.txt"), b"bravo").unwrap();
    let device = Arc::new(LocalDevice::new(dir.path()));
    (dir, device)
}

#[tokio::test]
async fn test_upload_reloads_displayed_directory() {
    let (_dir, device) = local_tree();
    let mut browser = browser_on(device).await;
    let local = tempfile::tempdir().unwrap();
    let source = local.path().join("photo.jpg");
    fs::write(&source, b"jpeg").unwrap();

    let ids = browser.upload_files(vec![source]).unwrap();
    assert_eq!(ids.len(), 1);
    let tasks = browser.tasks();
    assert_eq!(tasks[0].status, TaskStatus::Running);
    assert_eq!(tasks[0].name, "photo.jpg");

    let outcome = browser.next_transfer().await.unwrap();
    assert!(outcome.is_success());
    assert!(browser.is_loading());
    browser.settle().await;

    assert!(names(&browser).contains(&"photo.jpg".to_string()));
    assert_eq!(browser.tasks()[0].status, TaskStatus::Completed);
    assert_eq!(browser.clear_completed(), 1);
    assert!(browser.next_transfer().await.is_none());
}

#[tokio::test]
async fn test_upload_elsewhere_does_not_reload() {
    let (_dir, device) = local_tree();
    let mut browser = browser_on(device).await;
    let local = tempfile::tempdir().unwrap();
    let source = local.path().join("notes.txt");
    fs::write(&source, b"n").unwrap();

    let ids = browser.upload_files(vec![source]).unwrap();
    browser.navigate_to("/sdcard/Download/");
    browser.settle().await;

    // The outcome may already have been applied by `settle`.
    while browser.next_transfer().await.is_some() {}
    assert_eq!(
        browser.task_queue().get(ids[0]).unwrap().status,
        TaskStatus::Completed
    );
    assert!(!browser.is_loading());
    assert!(browser.listing().is_empty());
}

#[tokio::test]
async fn test_failed_upload_is_isolated() {
    let (_dir, device) = local_tree();
    let mut browser = browser_on(device).await;
    let local = tempfile::tempdir().unwrap();
    let good = local.path().join("good.txt");
    fs::write(&good, b"g").unwrap();

    let ids = browser
        .upload_files(vec![local.path().join("missing.txt"), good])
        .unwrap();
    browser.next_transfer().await.unwrap();
    browser.next_transfer().await.unwrap();
    browser.settle().await;

    let failed = browser.task_queue().get(ids[0]).unwrap();
    assert_eq!(failed.status, TaskStatus::Error);
    assert!(failed.error.is_some());
    assert_eq!(
        browser.task_queue().get(ids[1]).unwrap().status,
        TaskStatus::Completed
    );
    assert!(names(&browser).contains(&"good.txt".to_string()));

    assert!(browser.remove_task(ids[0]));
    assert_eq!(browser.tasks().len(), 1);
}

#[tokio::test]
async fn test_panicking_device_calls_settle_as_failures() {
    let mut browser = browser_on(Arc::new(PanickingDevice)).await;
    assert_eq!(names(&browser), vec!["a.txt"]);

    browser.navigate_to("/broken/");
    tokio::time::timeout(Duration::from_secs(5), browser.settle())
        .await
        .expect("load never settled");
    assert!(!browser.is_loading());
    assert!(browser.error().unwrap().contains("Directory load failed"));
    assert!(browser.listing().is_empty());

    let local = tempfile::tempdir().unwrap();
    let source = local.path().join("photo.jpg");
    fs::write(&source, b"jpeg").unwrap();
    let ids = browser.upload_files(vec![source]).unwrap();

    let outcome = tokio::time::timeout(Duration::from_secs(5), browser.next_transfer())
        .await
        .expect("transfer never settled")
        .unwrap();
    assert!(!outcome.is_success());
    let task = browser.task_queue().get(ids[0]).unwrap();
    assert_eq!(task.status, TaskStatus::Error);
    assert!(task.error.unwrap().contains("Transfer task failed"));
}

#[tokio::test]
async fn test_download_entry() {
    let (_dir, device) = local_tree();
    let mut browser = browser_on(device).await;
    let local = tempfile::tempdir().unwrap();
    let dest = local.path().join("a-copy.txt");

    browser.download("a.txt", dest.clone()).unwrap();
    let outcome = browser.next_transfer().await.unwrap();
    assert!(outcome.is_success());
    assert!(!browser.is_loading());
    assert_eq!(fs::read(dest).unwrap(), b"alpha");
}

#[tokio::test]
async fn test_cut_paste_moves_and_clears_clipboard() {
    let (dir, device) = local_tree();
    let mut browser = browser_on(device).await;

    browser.toggle_selection("a.txt");
    browser.cut_to_clipboard();
    browser.navigate_to("/sdcard/Download/");
    browser.settle().await;

    let complete = browser.paste().await.unwrap();
    assert_eq!(complete.succeeded, 1);
    assert!(browser.clipboard().is_empty());
    browser.settle().await;

    assert_eq!(names(&browser), vec!["a.txt"]);
    assert!(!dir.path().join("sdcard/a.txt").exists());
    assert_eq!(browser.paste().await.unwrap_err(), BrowserError::EmptyClipboard);
}

#[tokio::test]
async fn test_failed_cut_paste_still_clears_clipboard() {
    let (dir, device) = local_tree();
    let mut browser = browser_on(device).await;

    browser.toggle_selection("a.txt");
    browser.cut_to_clipboard();

    // Pasting into the source directory moves nothing.
    let complete = browser.paste().await.unwrap();
    assert_eq!(complete.succeeded, 0);
    assert_eq!(complete.failed, 1);
    assert!(browser.clipboard().is_empty());
    assert!(!browser.is_cut_file("a.txt"));
    browser.settle().await;

    assert!(dir.path().join("sdcard/a.txt").exists());
}

#[tokio::test]
async fn test_clipboard_refilled_during_cut_paste_is_kept() {
    let device = scripted();
    let mut browser = browser_on(device.clone()).await;
    let gate = device.gate("/sdcard/a.txt");

    browser.toggle_selection("a.txt");
    browser.cut_to_clipboard();
    browser.navigate_to("/sdcard/Download/");
    browser.settle().await;
    let ticket = browser.start_paste().unwrap();

    browser.navigate_back();
    browser.settle().await;
    browser.toggle_selection("b.txt");
    assert!(browser.copy_to_clipboard());

    gate.add_permits(1);
    let (finished, complete) = browser.next_operation().await.unwrap();
    assert_eq!(finished, ticket);
    assert_eq!(complete.succeeded, 1);

    let payload = browser.clipboard().payload().unwrap();
    assert_eq!(payload.operation, ClipboardOperation::Copy);
    assert!(payload.contains("b.txt"));
}

#[tokio::test]
async fn test_copy_paste_keeps_clipboard() {
    let (dir, device) = local_tree();
    let mut browser = browser_on(device).await;

    browser.toggle_selection("b.txt");
    browser.copy_to_clipboard();
    browser.navigate_to("/sdcard/Download/");
    browser.settle().await;

    let complete = browser.paste().await.unwrap();
    assert!(complete.is_success());
    assert_eq!(browser.clipboard().operation(), Some(ClipboardOperation::Copy));
    browser.settle().await;

    assert_eq!(names(&browser), vec!["b.txt"]);
    assert!(dir.path().join("sdcard/b.txt").exists());
}

#[tokio::test]
async fn test_mutations_reload_listing() {
    let (_dir, device) = local_tree();
    let mut browser = browser_on(device).await;

    let complete = browser.create_directory("Music").await.unwrap();
    assert!(complete.is_success());
    browser.settle().await;
    assert_eq!(names(&browser), vec!["Download", "Music", "a.txt", "b.txt"]);

    browser.rename("a.txt", "z.txt").await.unwrap();
    browser.settle().await;
    assert_eq!(names(&browser), vec!["Download", "Music", "b.txt", "z.txt"]);

    browser.select_range("b.txt", "z.txt");
    let complete = browser.delete_selected().await.unwrap();
    assert_eq!(complete.succeeded, 2);
    browser.settle().await;
    assert_eq!(names(&browser), vec!["Download", "Music"]);
    assert!(browser.selection().is_empty());
}

#[tokio::test]
async fn test_browsing_continues_while_operation_runs() {
    let device = scripted();
    let mut browser = browser_on(device.clone()).await;
    let gate = device.gate("/sdcard/Music");

    let ticket = browser.start_create_directory("Music").unwrap();
    assert!(browser.has_pending_operations());

    browser.navigate_to("/sdcard/Download/");
    browser.settle().await;
    assert_eq!(names(&browser), vec!["..", "song.mp3"]);
    browser.toggle_selection("song.mp3");
    assert_eq!(browser.selected_entries().len(), 1);
    assert!(browser.has_pending_operations());

    let mut events = browser.subscribe();
    gate.add_permits(1);
    let (finished, complete) = browser.next_operation().await.unwrap();
    assert_eq!(finished, ticket);
    assert!(complete.is_success());
    assert!(!browser.has_pending_operations());
    assert!(matches!(
        events.try_recv().unwrap(),
        BrowserEvent::OperationFinished { succeeded: 1, failed: 0, .. }
    ));

    // The finished operation reloads whatever is displayed now.
    assert!(browser.is_loading());
    browser.settle().await;
    assert_eq!(browser.current_path(), "/sdcard/Download/");
    assert!(browser.next_operation().await.is_none());
}

#[tokio::test]
async fn test_operations_need_a_device() {
    let mut browser = FileBrowser::new(scripted(), BrowserConfig::default());
    assert_eq!(
        browser.start_create_directory("Music").unwrap_err(),
        BrowserError::NoDevice
    );
    assert!(!browser.has_pending_operations());
}

#[tokio::test]
async fn test_rename_failure_is_reported() {
    let (_dir, device) = local_tree();
    let mut browser = browser_on(device).await;

    let complete = browser.rename("a.txt", "b.txt").await.unwrap();
    assert_eq!(complete.failed, 1);
    assert_eq!(complete.errors[0].path, "/sdcard/a.txt");
    browser.settle().await;
    assert_eq!(names(&browser), vec!["Download", "a.txt", "b.txt"]);
}
