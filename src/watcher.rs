//! One-shot directory watchers. A burst of filesystem events under one
//! directory reaches the table as a single settled change.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use notify_debouncer_mini::{
    new_debouncer, DebounceEventResult, DebouncedEventKind, Debouncer,
};
use tracing::debug;

use crate::config::DEFAULT_DEBOUNCE;

use crate::errors::domain::{DomainError, ErrorCode};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherErrorCode {
    Create,
    WatchPath,
}

impl ErrorCode for WatcherErrorCode {
    fn as_code_str(self) -> &'static str {
        match self {
            Self::Create => "watcher_create_failed",
            Self::WatchPath => "watch_path_failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct WatcherError {
    code: WatcherErrorCode,
    message: String,
}

impl WatcherError {
    pub fn new(code: WatcherErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for WatcherError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for WatcherError {}

impl DomainError for WatcherError {
    fn code_str(&self) -> &'static str {
        self.code.as_code_str()
    }

    fn message(&self) -> &str {
        &self.message
    }
}

pub type WatcherResult<T> = Result<T, WatcherError>;

/// Watches directories until they report one settled change. Each watcher
/// coalesces its own burst of events for `delay` before reporting, and is
/// dropped once it has fired; callers re-arm it if they still need it.
pub struct DirWatchSet {
    delay: Duration,
    tx: Sender<PathBuf>,
    rx: Receiver<PathBuf>,
    watchers: HashMap<PathBuf, Debouncer<RecommendedWatcher>>,
}

impl Default for DirWatchSet {
    fn default() -> Self {
        Self::new(DEFAULT_DEBOUNCE)
    }
}

impl DirWatchSet {
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            delay,
            tx,
            rx,
            watchers: HashMap::new(),
        }
    }

    /// Reports a settled change for `path` as if its watcher had fired.
    pub fn report(&self, path: &Path) {
        // The receiver lives in `self`.
        let _ = self.tx.send(path.to_path_buf());
    }

    pub fn is_watching(&self, path: &Path) -> bool {
        self.watchers.contains_key(path)
    }

    pub fn watch_once(&mut self, path: &Path) -> WatcherResult<()> {
        if self.watchers.contains_key(path) {
            return Ok(());
        }
        let tx = self.tx.clone();
        let watched_path = path.to_path_buf();
        let handler = move |res: DebounceEventResult| match res {
            Ok(events) => {
                let settled = events
                    .iter()
                    .any(|event| !matches!(event.kind, DebouncedEventKind::AnyContinuous));
                if settled {
                    // The receiving side may already be gone during shutdown.
                    let _ = tx.send(watched_path.clone());
                }
            }
            Err(error) => debug!("watch error on {}: {error}", watched_path.display()),
        };
        let mut debouncer = new_debouncer(self.delay, handler).map_err(|error| {
            WatcherError::new(
                WatcherErrorCode::Create,
                format!("Failed to create watcher: {error}"),
            )
        })?;

        debouncer
            .watcher()
            .watch(path, RecursiveMode::NonRecursive)
            .map_err(|error| {
                WatcherError::new(
                    WatcherErrorCode::WatchPath,
                    format!("Failed to watch path {}: {error}", path.display()),
                )
            })?;

        debug!("watching {} for spice config files", path.display());
        self.watchers.insert(path.to_path_buf(), debouncer);
        Ok(())
    }

    /// Cancels every watcher whose path is not in `keep`.
    pub fn retain(&mut self, keep: &BTreeSet<PathBuf>) {
        self.watchers.retain(|path, _| keep.contains(path));
    }

    /// Paths that fired since the last drain, deduplicated. Their watchers
    /// are spent and removed.
    pub fn drain(&mut self) -> BTreeSet<PathBuf> {
        let fired: BTreeSet<PathBuf> = self.rx.try_iter().collect();
        for path in &fired {
            self.watchers.remove(path);
        }
        fired
    }

    /// Drops watchers whose directory no longer exists.
    pub fn prune_missing(&mut self) -> Vec<PathBuf> {
        let missing: Vec<PathBuf> = self
            .watchers
            .keys()
            .filter(|path| !path.exists())
            .cloned()
            .collect();
        for path in &missing {
            debug!("{} vanished, cancelling its watcher", path.display());
            self.watchers.remove(path);
        }
        missing
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Instant;

    #[test]
    fn drained_paths_are_deduplicated() {
        let mut set = DirWatchSet::default();
        set.report(Path::new("/tmp/a"));
        set.report(Path::new("/tmp/a"));
        set.report(Path::new("/tmp/b"));
        let fired = set.drain();
        assert_eq!(fired.len(), 2);
        assert!(set.drain().is_empty());
    }

    #[test]
    fn a_burst_of_writes_fires_once() {
        let dir = std::env::temp_dir().join(format!(
            "cinnamon-keybindings-test-watch-{}",
            std::process::id()
        ));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let mut set = DirWatchSet::new(Duration::from_millis(100));
        set.watch_once(&dir).unwrap();
        assert!(set.is_watching(&dir));

        for n in 0..5 {
            fs::write(dir.join(format!("{n}.json")), "{}").unwrap();
        }

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut fired = BTreeSet::new();
        while fired.is_empty() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(20));
            fired = set.drain();
        }
        assert_eq!(fired, BTreeSet::from([dir.clone()]));
        assert!(set.is_empty());
        let _ = fs::remove_dir_all(&dir);
    }
}
