//! Watch layer for live config reload.
//!
//! This module provides:
//! - Stem-based routing of change notifications ([`Dispatcher`], [`ReloadHandler`]),
//!   coalesced over a [`QuietWindow`]
//! - The `notify`-backed directory watch ([`WatchSubscription`])
//! - Reloading the users overlay ([`OverlayReloader`])
//!
//! Only the overlay file (`users.*`) is reloaded. Changes to the primary
//! `config.*` file, or to anything else in a watched directory, are ignored.

mod dispatch;
mod reload;
mod subscription;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;

pub use dispatch::{Dispatcher, QuietWindow, ReloadHandler, stem};
pub use reload::{OverlayReloader, ReloadOutcome};
pub use subscription::WatchSubscription;

use std::path::PathBuf;

use thiserror::Error;

/// Error type for setting up a watch.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The platform watcher could not be created.
    #[error("Failed to create file watcher: {0}")]
    Create(#[from] notify::Error),

    /// A directory could not be added to the watch.
    #[error("Failed to watch '{}': {source}", path.display())]
    Watch {
        /// The directory
        path: PathBuf,
        /// Underlying watcher error
        #[source]
        source: notify::Error,
    },

    /// None of the candidate directories exist.
    #[error("No config directory exists to watch")]
    NothingToWatch,
}
