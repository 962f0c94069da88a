//! farfile - Browse and transfer files on a remote device.
//!
//! Usage:
//!   farfile ls [PATH]              List a remote directory
//!   farfile get REMOTE [DEST]      Download a remote file
//!   farfile put LOCAL... [--to]    Upload local files
//!   farfile browse [PATH]          Interactive browser shell
//!   farfile --help                 Show help
//!
//! The remote side is served by a local directory (`--root`), which stands in
//! for a device reached through the same command interface.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use color_eyre::eyre::{Context, Result, bail};
use humansize::{DECIMAL, format_size};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use farfile_browser::{BrowserError, FileBrowser};
use farfile_core::path::{ensure_dir_suffix, file_name_of};
use farfile_core::{BrowserConfig, DeviceCommands, FileEntry, SearchMode};
use farfile_ops::{LocalDevice, OperationComplete, TransferLauncher, TransferTaskQueue};

#[derive(Parser)]
#[command(
    name = "farfile",
    version,
    about = "Browse and transfer files on a remote device",
    long_about = "farfile navigates a device's directory tree, runs background \
                  uploads and downloads, and copies, moves, renames and deletes \
                  remote entries.\n\n\
                  Set FARFILE_LOG (e.g. `FARFILE_LOG=debug`) for diagnostics."
)]
struct Cli {
    /// Local directory served as the device's filesystem
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// Device identifier passed to every command
    #[arg(short, long, default_value = "local", global = true)]
    device: String,

    /// Config file (defaults to the user config directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List a remote directory
    Ls {
        /// Remote directory (defaults to the configured home path)
        path: Option<String>,

        /// Include dot-files
        #[arg(short, long)]
        all: bool,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// Download a remote file
    Get {
        /// Remote file path
        remote: String,

        /// Local destination (defaults to the file name in the current directory)
        dest: Option<PathBuf>,
    },

    /// Upload local files into a remote directory
    Put {
        /// Local files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Remote directory (defaults to the configured home path)
        #[arg(short, long)]
        to: Option<String>,
    },

    /// Interactive browser shell
    Browse {
        /// Remote directory to start in
        path: Option<String>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum, Default)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => BrowserConfig::load_from(path),
        None => BrowserConfig::load(),
    }
    .context("Failed to load config")?;

    let root = cli.root.canonicalize().context("Invalid root")?;
    debug!(root = %root.display(), device = %cli.device, "Serving device");
    let device: Arc<dyn DeviceCommands> = Arc::new(LocalDevice::new(root));

    match cli.command {
        Command::Ls { path, all, format } => {
            run_ls(device, config, &cli.device, path, all, format).await?;
        }
        Command::Get { remote, dest } => {
            run_get(device, &cli.device, &remote, dest).await?;
        }
        Command::Put { files, to } => {
            let to = to.unwrap_or_else(|| config.home_path.clone());
            run_put(device, &cli.device, files, &to).await?;
        }
        Command::Browse { path } => {
            run_browse(device, config, &cli.device, path).await?;
        }
    }

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("FARFILE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Create a browser, select the device and wait for the first listing.
async fn open_browser(
    device: Arc<dyn DeviceCommands>,
    config: BrowserConfig,
    device_id: &str,
    path: Option<String>,
) -> FileBrowser {
    let mut browser = FileBrowser::new(device, config);
    if let Some(path) = path {
        browser.navigate_to(ensure_dir_suffix(&path));
    }
    browser.select_device(Some(device_id.to_string()));
    browser.settle().await;
    browser
}

/// List a directory once.
async fn run_ls(
    device: Arc<dyn DeviceCommands>,
    config: BrowserConfig,
    device_id: &str,
    path: Option<String>,
    all: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut browser = open_browser(device, config, device_id, path).await;
    if all {
        browser.set_show_hidden(true);
    }
    if let Some(error) = browser.error() {
        bail!("{}: {error}", browser.current_path());
    }

    let entries = browser.visible_entries();
    match format {
        OutputFormat::Text => {
            println!("{}", browser.current_path());
            print_entries(&browser, &entries);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }

    Ok(())
}

/// Download one file and wait for it.
async fn run_get(
    device: Arc<dyn DeviceCommands>,
    device_id: &str,
    remote: &str,
    dest: Option<PathBuf>,
) -> Result<()> {
    let dest = dest.unwrap_or_else(|| PathBuf::from(file_name_of(remote)));
    let launcher = TransferLauncher::new(device, TransferTaskQueue::new());

    let outcome = launcher.download(device_id, remote, dest.clone()).wait().await;
    outcome
        .result
        .with_context(|| format!("Failed to download {remote}"))?;

    println!("{} -> {}", remote, dest.display());
    Ok(())
}

/// Upload files concurrently and report each result.
async fn run_put(
    device: Arc<dyn DeviceCommands>,
    device_id: &str,
    files: Vec<PathBuf>,
    remote_dir: &str,
) -> Result<()> {
    let remote_dir = ensure_dir_suffix(remote_dir);
    let launcher = TransferLauncher::new(device, TransferTaskQueue::new());
    let total: u64 = files.iter().map(|f| local_size(f)).sum();

    let handles: Vec<_> = files
        .into_iter()
        .map(|file| launcher.upload(device_id, file, &remote_dir))
        .collect();

    let mut failed = 0;
    for handle in handles {
        let outcome = handle.wait().await;
        match &outcome.result {
            Ok(()) => println!("  ok    {}", outcome.remote_path),
            Err(e) => {
                failed += 1;
                println!("  error {}: {e}", outcome.name);
            }
        }
    }

    if failed > 0 {
        bail!("{failed} upload(s) failed");
    }
    eprintln!("Uploaded {} to {remote_dir}", format_size(total, DECIMAL));
    Ok(())
}

fn local_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

fn print_entries(browser: &FileBrowser, entries: &[&FileEntry]) {
    if entries.is_empty() {
        println!("  (empty)");
        return;
    }

    for entry in entries {
        let mark = match (
            browser.selection().contains(&entry.name),
            browser.is_cut_file(&entry.name),
        ) {
            (_, true) => '~',
            (true, false) => '*',
            (false, false) => ' ',
        };
        let suffix = if entry.is_dir { "/" } else { "" };
        println!(
            "{mark} {:<10} {:>10}  {}{suffix}",
            entry.permissions,
            entry.display_size(),
            entry.name
        );
    }
}

fn print_complete(complete: &OperationComplete) {
    println!("{}", complete.summary());
    for error in &complete.errors {
        println!("  {error}");
    }
}

const BROWSE_HELP: &str = "\
commands:
  ls                      show the directory
  cd NAME|PATH            enter a directory
  up | back | fwd         navigate
  refresh                 reload the directory
  sel NAME                toggle selection
  range FROM TO           add a span to the selection
  all | none              select everything / nothing
  find [TEXT]             filter by name (empty clears)
  glob                    toggle glob search
  hidden                  toggle dot-files
  cp | mv | paste         clipboard
  rm                      delete the selection
  mkdir NAME              create a directory
  rename NAME NEW         rename an entry
  cat NAME                preview a file
  put LOCAL...            upload into this directory
  get NAME DEST           download an entry
  tasks | clean           show / clear finished transfers
  quit";

/// Line-oriented browser shell on stdin.
async fn run_browse(
    device: Arc<dyn DeviceCommands>,
    config: BrowserConfig,
    device_id: &str,
    path: Option<String>,
) -> Result<()> {
    let mut browser = open_browser(device, config, device_id, path).await;
    show(&browser);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        eprint!("{}> ", browser.current_path());
        let Some(line) = lines.next_line().await? else {
            break;
        };
        browser.pump();

        let words: Vec<&str> = line.split_whitespace().collect();
        let Some((&command, args)) = words.split_first() else {
            continue;
        };

        match dispatch(&mut browser, command, args).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break,
            Err(e) => println!("error: {e}"),
        }
    }

    Ok(())
}

enum Flow {
    Continue,
    Quit,
}

async fn dispatch(
    browser: &mut FileBrowser,
    command: &str,
    args: &[&str],
) -> Result<Flow, BrowserError> {
    match (command, args) {
        ("quit" | "exit" | "q", _) => return Ok(Flow::Quit),
        ("help" | "?", _) => println!("{BROWSE_HELP}"),
        ("ls", _) => show(browser),
        ("cd", [target]) => {
            if target.starts_with('/') {
                browser.navigate_to(ensure_dir_suffix(target));
            } else {
                browser.open(target)?;
            }
            settle_and_show(browser).await;
        }
        ("up", _) => {
            browser.navigate_up();
            settle_and_show(browser).await;
        }
        ("back", _) => {
            browser.navigate_back();
            settle_and_show(browser).await;
        }
        ("fwd", _) => {
            browser.navigate_forward();
            settle_and_show(browser).await;
        }
        ("refresh", _) => {
            browser.refresh();
            settle_and_show(browser).await;
        }
        ("sel", [name]) => browser.toggle_selection(name),
        ("range", [from, to]) => {
            if !browser.select_range(from, to) {
                println!("both names must be displayed");
            }
        }
        ("all", _) => browser.select_all(),
        ("none", _) => browser.clear_selection(),
        ("find", words) => {
            browser.set_search(words.join(" "));
            show(browser);
        }
        ("glob", _) => {
            let mode = browser.filter().mode().next();
            browser.set_search_mode(mode);
            let name = match mode {
                SearchMode::Substring => "substring",
                SearchMode::Glob => "glob",
            };
            println!("search mode: {name}");
        }
        ("hidden", _) => {
            let show_hidden = !browser.filter().show_hidden();
            browser.set_show_hidden(show_hidden);
            show(browser);
        }
        ("cp", _) => {
            if !browser.copy_to_clipboard() {
                println!("nothing selected");
            }
        }
        ("mv", _) => {
            if !browser.cut_to_clipboard() {
                println!("nothing selected");
            }
        }
        ("paste", _) => {
            print_complete(&browser.paste().await?);
            settle_and_show(browser).await;
        }
        ("rm", _) => {
            print_complete(&browser.delete_selected().await?);
            settle_and_show(browser).await;
        }
        ("mkdir", [name]) => {
            print_complete(&browser.create_directory(*name).await?);
            settle_and_show(browser).await;
        }
        ("rename", [name, new_name]) => {
            print_complete(&browser.rename(name, *new_name).await?);
            settle_and_show(browser).await;
        }
        ("cat", [name]) => {
            let bytes = browser.read_file(name).await?;
            println!("{}", String::from_utf8_lossy(&bytes));
        }
        ("put", files) if !files.is_empty() => {
            let ids = browser.upload_files(files.iter().map(PathBuf::from))?;
            println!("started {} upload(s)", ids.len());
        }
        ("get", [name, dest]) => {
            browser.download(name, PathBuf::from(dest))?;
            println!("download started");
        }
        ("tasks", _) => {
            for task in browser.tasks() {
                let error = task.error.as_deref().unwrap_or("");
                println!(
                    "  {:<9} {:<8} {:>3}%  {} {error}",
                    task.status, task.kind, task.progress, task.name
                );
            }
        }
        ("clean", _) => println!("removed {} task(s)", browser.clear_completed()),
        _ => println!("unknown command, try `help`"),
    }

    Ok(Flow::Continue)
}

async fn settle_and_show(browser: &mut FileBrowser) {
    browser.settle().await;
    show(browser);
}

fn show(browser: &FileBrowser) {
    if let Some(error) = browser.error() {
        println!("{}: {error}", browser.current_path());
        return;
    }
    print_entries(browser, &browser.visible_entries());
}
