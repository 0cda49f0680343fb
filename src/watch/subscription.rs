//! File system watch backed by `notify`.

use std::path::{Path, PathBuf};

use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::UnboundedReceiverStream;

use super::WatchError;
use super::dispatch::Dispatcher;

/// An armed watch over a set of directories.
///
/// The OS watcher forwards changed paths over a channel to a single
/// dispatch task. Both live as long as this value; there is no other
/// teardown.
pub struct WatchSubscription {
    watched: Vec<PathBuf>,
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl std::fmt::Debug for WatchSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSubscription")
            .field("watched", &self.watched)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl WatchSubscription {
    /// Starts watching every existing directory in `dirs` and spawns the
    /// dispatch loop on the current tokio runtime.
    ///
    /// Directories that do not exist are skipped, and stay unwatched if
    /// they are created later.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or a directory
    /// cannot be watched, or if none of `dirs` exists.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn arm(dirs: &[PathBuf], dispatcher: Dispatcher) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::unbounded_channel();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) if is_content_change(event.kind) => {
                for path in event.paths {
                    // Receiver gone means the dispatch loop has ended.
                    if tx.send(path).is_err() {
                        return;
                    }
                }
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("File watch error: {e}"),
        })?;

        let mut watched = Vec::new();
        for dir in dirs.iter().filter(|dir| is_watchable(dir)) {
            watcher
                .watch(dir, RecursiveMode::NonRecursive)
                .map_err(|source| WatchError::Watch {
                    path: dir.clone(),
                    source,
                })?;
            watched.push(dir.clone());
        }

        if watched.is_empty() {
            return Err(WatchError::NothingToWatch);
        }

        tracing::info!(
            "Watching for config changes in: {}",
            watched
                .iter()
                .map(|dir| dir.display().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let task = tokio::spawn(dispatcher.run(UnboundedReceiverStream::new(rx)));

        Ok(Self {
            watched,
            _watcher: watcher,
            task,
        })
    }

    /// Returns the directories actually being watched.
    #[must_use]
    pub fn watched(&self) -> &[PathBuf] {
        &self.watched
    }

    /// Returns `true` while the dispatch loop is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

/// Creates, writes and renames count; access and removal do not.
const fn is_content_change(kind: EventKind) -> bool {
    matches!(kind, EventKind::Create(_) | EventKind::Modify(_))
}

fn is_watchable(dir: &Path) -> bool {
    if dir.is_dir() {
        return true;
    }
    tracing::debug!("Not watching missing directory {}", dir.display());
    false
}
