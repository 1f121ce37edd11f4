//! Recursive project watcher built on `notify`'s `RecommendedWatcher`, with
//! a 100ms debounce/coalescing window over arbitrary tracked paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher as _};

use crate::cancel::CancelToken;
use crate::error::{LokoError, Result};

const DEBOUNCE_WINDOW: Duration = Duration::from_millis(100);
const POLL_INTERVAL: Duration = Duration::from_millis(20);

const IGNORED_DIRS: &[&str] = &[
    "dist",
    ".git",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    "build",
    "target",
    ".loko",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchOp {
    Create,
    Write,
    Remove,
    Rename,
    Chmod,
}

impl WatchOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            WatchOp::Create => "create",
            WatchOp::Write => "write",
            WatchOp::Remove => "remove",
            WatchOp::Rename => "rename",
            WatchOp::Chmod => "chmod",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatchEvent {
    /// Forward-slashed, lower-cased, relative to the watched root.
    pub path: String,
    pub op: WatchOp,
}

/// True if `path` should never be reported: lives under one of the ignored
/// directories, or under any dot-directory.
fn is_ignored(relative: &Path) -> bool {
    relative.components().any(|c| {
        let s = c.as_os_str().to_string_lossy();
        IGNORED_DIRS.contains(&s.as_ref()) || (s.starts_with('.') && s.as_ref() != ".")
    })
}

/// `.md`/`.d2` only.
fn is_tracked_extension(path: &Path) -> bool {
    matches!(path.extension().and_then(|e| e.to_str()), Some("md") | Some("d2"))
}

fn normalize(root: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).unwrap_or(path);
    if is_ignored(relative) || !is_tracked_extension(relative) {
        return None;
    }
    Some(relative.to_string_lossy().replace('\\', "/").to_lowercase())
}

fn classify(kind: &EventKind) -> Option<WatchOp> {
    match kind {
        EventKind::Create(_) => Some(WatchOp::Create),
        EventKind::Remove(_) => Some(WatchOp::Remove),
        EventKind::Modify(notify::event::ModifyKind::Name(_)) => Some(WatchOp::Rename),
        EventKind::Modify(notify::event::ModifyKind::Metadata(notify::event::MetadataKind::Permissions)) => {
            Some(WatchOp::Chmod)
        }
        EventKind::Modify(_) => Some(WatchOp::Write),
        _ => None,
    }
}

/// A running watch over one project root. `stop()` is idempotent: calling
/// it twice, or dropping without calling it, never panics or double-closes
/// the channel.
pub struct ProjectWatcher {
    _watcher: RecommendedWatcher,
    worker: Mutex<Option<JoinHandle<()>>>,
    stopped: Arc<std::sync::atomic::AtomicBool>,
}

impl ProjectWatcher {
    /// Starts watching `root` recursively. Returns the watcher handle plus
    /// the receiver end of the coalesced event channel.
    pub fn start(root: &Path, cancel: CancelToken) -> Result<(Self, Receiver<WatchEvent>)> {
        let root = root.to_path_buf();
        let (raw_tx, raw_rx) = mpsc::channel::<notify::Event>();
        let (out_tx, out_rx) = mpsc::channel::<WatchEvent>();

        let mut watcher = notify::recommended_watcher(move |res: std::result::Result<notify::Event, notify::Error>| {
            if let Ok(event) = res {
                let _ = raw_tx.send(event);
            }
        })
        .map_err(|e| LokoError::ProtocolError(format!("failed to start watcher: {e}")))?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| LokoError::ProtocolError(format!("failed to watch {}: {e}", root.display())))?;

        let stopped = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let worker_stopped = stopped.clone();
        let worker = std::thread::spawn(move || debounce_loop(root, raw_rx, out_tx, cancel, worker_stopped));

        Ok((
            ProjectWatcher {
                _watcher: watcher,
                worker: Mutex::new(Some(worker)),
                stopped,
            },
            out_rx,
        ))
    }

    /// Idempotent: only the first call joins the worker thread.
    pub fn stop(&self) {
        self.stopped.store(true, std::sync::atomic::Ordering::SeqCst);
        if let Some(handle) = self.worker.lock().unwrap().take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProjectWatcher {
    fn drop(&mut self) {
        self.stop();
    }
}

fn debounce_loop(
    root: PathBuf,
    raw_rx: Receiver<notify::Event>,
    out_tx: Sender<WatchEvent>,
    cancel: CancelToken,
    stopped: Arc<std::sync::atomic::AtomicBool>,
) {
    let mut pending: HashMap<String, (WatchOp, Instant)> = HashMap::new();

    loop {
        if cancel.is_cancelled() || stopped.load(std::sync::atomic::Ordering::SeqCst) {
            break;
        }

        match raw_rx.recv_timeout(POLL_INTERVAL) {
            Ok(event) => {
                let Some(op) = classify(&event.kind) else { continue };
                for path in &event.paths {
                    if let Some(normalized) = normalize(&root, path) {
                        pending.entry(normalized).or_insert((op, Instant::now())).0 = op;
                    }
                }
            }
            Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }

        let now = Instant::now();
        let ready: Vec<String> = pending
            .iter()
            .filter(|(_, (_, first_seen))| now.duration_since(*first_seen) >= DEBOUNCE_WINDOW)
            .map(|(path, _)| path.clone())
            .collect();

        for path in ready {
            if let Some((op, _)) = pending.remove(&path) {
                if out_tx.send(WatchEvent { path, op }).is_err() {
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ignores_dot_directories_and_configured_names() {
        assert!(is_ignored(Path::new(".git/HEAD")));
        assert!(is_ignored(Path::new("dist/diagrams/a.svg")));
        assert!(is_ignored(Path::new("src/.loko/cache")));
        assert!(!is_ignored(Path::new("src/payments/system.md")));
    }

    #[test]
    fn only_md_and_d2_are_tracked() {
        assert!(is_tracked_extension(Path::new("system.md")));
        assert!(is_tracked_extension(Path::new("system.d2")));
        assert!(!is_tracked_extension(Path::new("system.svg")));
    }

    #[test]
    fn normalize_lowercases_and_forward_slashes() {
        let root = Path::new("/proj");
        let got = normalize(root, Path::new("/proj/SRC/Payments/System.md")).unwrap();
        assert_eq!(got, "src/payments/system.md");
    }

    #[test]
    fn start_and_stop_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let (watcher, _rx) = ProjectWatcher::start(dir.path(), CancelToken::new()).unwrap();
        watcher.stop();
        watcher.stop();
    }
}
