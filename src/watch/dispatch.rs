//! Routing of file change notifications to reload handlers.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio_stream::{Stream, StreamExt};

/// Handles a change to one logical config file.
pub trait ReloadHandler: Send {
    /// Called with the path of the changed file.
    fn reload(&mut self, path: &Path);
}

impl<F> ReloadHandler for F
where
    F: FnMut(&Path) + Send,
{
    fn reload(&mut self, path: &Path) {
        self(path);
    }
}

/// Returns a file's base name without its extension.
///
/// `/etc/phenix/users.toml` has the stem `users`.
#[must_use]
pub fn stem(path: &Path) -> Option<&str> {
    path.file_stem().and_then(|stem| stem.to_str())
}

/// How long the dispatch loop waits for notifications to stop arriving.
///
/// A single save often produces several notifications, some of them while
/// the file is still being written (truncate, then write). Handlers only
/// run once the window passes with no further notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuietWindow {
    window: Duration,
}

impl QuietWindow {
    /// Creates a quiet window of the given length.
    #[must_use]
    pub const fn new(window: Duration) -> Self {
        Self { window }
    }

    /// Returns the window length.
    #[must_use]
    pub const fn window(&self) -> Duration {
        self.window
    }
}

impl Default for QuietWindow {
    /// Creates a 200 ms quiet window.
    fn default() -> Self {
        Self::new(Duration::from_millis(200))
    }
}

/// Dispatch table mapping file stems to handlers.
///
/// Changes to files whose stem has no handler are ignored.
#[derive(Default)]
pub struct Dispatcher {
    handlers: HashMap<String, Box<dyn ReloadHandler>>,
    quiet: QuietWindow,
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("stems", &self.handlers.keys().collect::<Vec<_>>())
            .field("quiet", &self.quiet)
            .finish()
    }
}

impl Dispatcher {
    /// Creates an empty dispatch table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for files with the given stem.
    #[must_use]
    pub fn on(mut self, stem: impl Into<String>, handler: impl ReloadHandler + 'static) -> Self {
        self.handlers.insert(stem.into(), Box::new(handler));
        self
    }

    /// Sets the quiet window used by [`Dispatcher::run`].
    #[must_use]
    pub const fn with_quiet_window(mut self, quiet: QuietWindow) -> Self {
        self.quiet = quiet;
        self
    }

    /// Returns `true` if a handler is registered for `stem`.
    #[must_use]
    pub fn handles(&self, stem: &str) -> bool {
        self.handlers.contains_key(stem)
    }

    /// Dispatches one change notification immediately.
    ///
    /// Returns `true` if a handler was invoked.
    pub fn dispatch(&mut self, path: &Path) -> bool {
        let Some(handler) = stem(path).and_then(|stem| self.handlers.get_mut(stem)) else {
            tracing::trace!("Ignoring change to {}", path.display());
            return false;
        };

        tracing::debug!("Change detected: {}", path.display());
        handler.reload(path);
        true
    }

    /// Dispatches notifications until the stream ends.
    ///
    /// Notifications are collected until the quiet window passes without a
    /// new one; then each affected handler runs once, with the latest path
    /// seen for its stem. Pending changes are still dispatched when the
    /// stream ends.
    pub async fn run<S>(mut self, mut events: S)
    where
        S: Stream<Item = PathBuf> + Unpin,
    {
        let mut open = true;

        while open {
            let Some(first) = events.next().await else {
                break;
            };

            let mut pending = BTreeMap::new();
            if !self.queue(&mut pending, first) {
                continue;
            }

            loop {
                match tokio::time::timeout(self.quiet.window(), events.next()).await {
                    Ok(Some(path)) => {
                        self.queue(&mut pending, path);
                    }
                    Ok(None) => {
                        open = false;
                        break;
                    }
                    Err(_elapsed) => break,
                }
            }

            for path in pending.into_values() {
                self.dispatch(&path);
            }
        }

        tracing::debug!("Change notification stream closed");
    }

    /// Records `path` as pending if its stem has a handler.
    fn queue(&self, pending: &mut BTreeMap<String, PathBuf>, path: PathBuf) -> bool {
        let Some(stem) = stem(&path).filter(|stem| self.handles(stem)) else {
            tracing::trace!("Ignoring change to {}", path.display());
            return false;
        };

        let stem = stem.to_string();
        pending.insert(stem, path);
        true
    }
}
