//! Live reload of the users overlay file.

use std::path::Path;
use std::sync::Arc;

use crate::collab::UserListConsumer;
use crate::config::{ConfigRegistry, FileRole, OverlayUpdate, SearchPath, load_role};

use super::dispatch::ReloadHandler;

/// What a reload attempt did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The overlay changed; the consumer received the new user list.
    Applied(Vec<String>),
    /// The overlay content was identical; nothing happened.
    Unchanged,
    /// No overlay file was found; previous values stay in effect.
    Missing,
    /// The overlay file could not be loaded; previous values stay in effect.
    Failed(String),
}

/// Re-reads the overlay file and pushes `ui.users` to the consumer.
///
/// Reloading is idempotent: re-running with unchanged content does not call
/// the consumer. Failures never touch the current configuration.
pub struct OverlayReloader {
    registry: Arc<ConfigRegistry>,
    search: SearchPath,
    consumer: Arc<dyn UserListConsumer>,
}

impl OverlayReloader {
    /// Creates a reloader over the given search directories.
    #[must_use]
    pub fn new(
        registry: Arc<ConfigRegistry>,
        search: SearchPath,
        consumer: Arc<dyn UserListConsumer>,
    ) -> Self {
        Self {
            registry,
            search,
            consumer,
        }
    }

    /// Reloads the overlay now.
    pub fn reload_now(&self) -> ReloadOutcome {
        let found = match load_role(&self.search, FileRole::Overlay) {
            Ok(Some(found)) => found,
            Ok(None) => {
                tracing::warn!("Overlay file no longer found; keeping previous users");
                return ReloadOutcome::Missing;
            }
            Err(e) => {
                tracing::error!("Failed to reload overlay, keeping previous users: {e}");
                return ReloadOutcome::Failed(e.to_string());
            }
        };

        match self.registry.replace_overlay(found.layer) {
            OverlayUpdate::Unchanged => {
                tracing::debug!("Overlay {} unchanged", found.path.display());
                ReloadOutcome::Unchanged
            }
            OverlayUpdate::Applied { users } => {
                tracing::info!("Reloaded overlay {}", found.path.display());
                self.consumer.configure_users(&users);
                ReloadOutcome::Applied(users)
            }
        }
    }
}

impl ReloadHandler for OverlayReloader {
    fn reload(&mut self, _path: &Path) {
        self.reload_now();
    }
}
