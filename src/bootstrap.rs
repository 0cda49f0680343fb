//! Application startup and shutdown.
//!
//! Startup runs in a fixed order:
//! 1. Resolve the effective identity (done by the caller)
//! 2. Compute identity-dependent defaults and search paths ([`Bootstrap::new`])
//! 3. Parse flags (done by the caller, using [`Bootstrap::defaults`] for help)
//! 4. Merge every configuration source
//! 5. Initialize storage, the fatal log and default configs
//! 6. Push the initial user list and arm the overlay watch, if the overlay exists
//!
//! Shutdown releases the fatal log whether or not the command succeeded.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::collab::{
    CollabError, ConfigSeeder, FatalLog, FatalLogInitializer, StoreInitializer, UserListConsumer,
};
use crate::config::{self, ConfigError, ConfigRegistry, Layer, SearchPath, Settings, defaults};
use crate::identity::{EffectiveIdentity, IdentityError, Invocation};
use crate::watch::{Dispatcher, OverlayReloader, WatchSubscription};

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod tests;

/// Error type for startup failures. Every variant aborts the process.
#[derive(Debug, Error)]
pub enum BootstrapError {
    /// The effective identity could not be determined.
    #[error(transparent)]
    Identity(#[from] IdentityError),

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Storage initialization failed.
    #[error("Initializing storage: {0}")]
    Store(#[source] CollabError),

    /// The fatal log writer could not be opened.
    #[error("Unable to initialize fatal log writer: {0}")]
    FatalLog(#[source] CollabError),

    /// Seeding default configs failed.
    #[error("Unable to initialize default configs: {0}")]
    Seed(#[source] CollabError),
}

/// The subsystems configured during startup.
pub struct Collaborators {
    /// Storage backend
    pub store: Box<dyn StoreInitializer>,
    /// Fatal error log
    pub fatal_log: Box<dyn FatalLogInitializer>,
    /// Default config seeder
    pub seeder: Box<dyn ConfigSeeder>,
    /// Web UI user list
    pub users: Arc<dyn UserListConsumer>,
}

/// Identity-derived startup state, before any source is loaded.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    identity: EffectiveIdentity,
    search: SearchPath,
    defaults: Layer,
    system_dirs: Vec<PathBuf>,
}

impl Bootstrap {
    /// Derives defaults and search paths from the identity.
    #[must_use]
    pub fn new(identity: EffectiveIdentity) -> Self {
        let search = SearchPath::for_identity(&identity);
        Self::with_search(identity, search)
    }

    /// Like [`Bootstrap::new`], but searching `search` for config files.
    #[must_use]
    pub fn with_search(identity: EffectiveIdentity, search: SearchPath) -> Self {
        let invocation = identity.invocation();
        let default_layer = defaults::layer(invocation);
        let system_dirs = match invocation {
            Invocation::Superuser => vec![
                PathBuf::from(defaults::SYSTEM_CONFIG_DIR),
                PathBuf::from(defaults::SYSTEM_LOG_DIR),
            ],
            Invocation::User { .. } => Vec::new(),
        };

        Self {
            identity,
            search,
            defaults: default_layer,
            system_dirs,
        }
    }

    /// Overrides the directories created for a superuser at startup.
    #[must_use]
    pub fn with_system_dirs(mut self, dirs: Vec<PathBuf>) -> Self {
        self.system_dirs = dirs;
        self
    }

    /// Returns the effective identity.
    #[must_use]
    pub const fn identity(&self) -> &EffectiveIdentity {
        &self.identity
    }

    /// Returns the default layer, also shown in `--help`.
    #[must_use]
    pub const fn defaults(&self) -> &Layer {
        &self.defaults
    }

    /// Returns the config file search path.
    #[must_use]
    pub const fn search(&self) -> &SearchPath {
        &self.search
    }

    /// Loads configuration and initializes every collaborator.
    ///
    /// Must be called within a tokio runtime if the overlay file exists,
    /// since the watch dispatch loop is spawned onto it.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded or any collaborator
    /// fails to initialize. Failing to arm the watch is only logged.
    pub fn start<F>(
        &self,
        flags: Layer,
        env_lookup: F,
        collab: &Collaborators,
    ) -> Result<Session, BootstrapError>
    where
        F: Fn(&str) -> Option<String>,
    {
        tracing::debug!("Effective identity: {}", self.identity);

        let loaded = config::load(self.search.clone(), self.defaults.clone(), flags, env_lookup)?;
        let registry = Arc::new(loaded.registry);
        let settings = registry.settings();

        self.create_system_dirs();

        collab
            .store
            .init(&settings.store_endpoint)
            .map_err(BootstrapError::Store)?;

        let fatal_log = collab
            .fatal_log
            .init(&settings.error_file, settings.error_stderr)
            .map_err(BootstrapError::FatalLog)?;

        collab.seeder.seed().map_err(BootstrapError::Seed)?;

        let watch = if loaded.overlay_path.is_some() {
            collab.users.configure_users(&settings.users);
            arm_overlay_watch(&registry, &loaded.search, &collab.users)
        } else {
            tracing::debug!("No users file found; live reload disabled");
            None
        };

        Ok(Session {
            registry,
            search: loaded.search,
            primary_path: loaded.primary_path,
            overlay_path: loaded.overlay_path,
            fatal_log,
            watch,
        })
    }

    fn create_system_dirs(&self) {
        for dir in &self.system_dirs {
            if let Err(e) = std::fs::create_dir_all(dir) {
                tracing::warn!("Unable to create {}: {e}", dir.display());
            }
        }
    }
}

fn arm_overlay_watch(
    registry: &Arc<ConfigRegistry>,
    search: &SearchPath,
    users: &Arc<dyn UserListConsumer>,
) -> Option<WatchSubscription> {
    let reloader = OverlayReloader::new(Arc::clone(registry), search.clone(), Arc::clone(users));
    let dispatcher = Dispatcher::new().on(config::FileRole::Overlay.stem(), reloader);

    match WatchSubscription::arm(search.dirs(), dispatcher) {
        Ok(subscription) => Some(subscription),
        Err(e) => {
            tracing::warn!("Live reload of users disabled: {e}");
            None
        }
    }
}

/// A started application: merged configuration plus live resources.
pub struct Session {
    registry: Arc<ConfigRegistry>,
    search: SearchPath,
    primary_path: Option<PathBuf>,
    overlay_path: Option<PathBuf>,
    fatal_log: Box<dyn FatalLog>,
    watch: Option<WatchSubscription>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("primary_path", &self.primary_path)
            .field("overlay_path", &self.overlay_path)
            .field("watch", &self.watch)
            .finish_non_exhaustive()
    }
}

impl Session {
    /// Returns the shared configuration.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ConfigRegistry> {
        &self.registry
    }

    /// Returns a snapshot of the merged configuration.
    #[must_use]
    pub fn settings(&self) -> Settings {
        self.registry.settings()
    }

    /// Returns the directories searched for config files.
    #[must_use]
    pub const fn search(&self) -> &SearchPath {
        &self.search
    }

    /// Returns the primary config file, if one was loaded.
    #[must_use]
    pub fn primary_path(&self) -> Option<&Path> {
        self.primary_path.as_deref()
    }

    /// Returns the overlay config file, if one was loaded.
    #[must_use]
    pub fn overlay_path(&self) -> Option<&Path> {
        self.overlay_path.as_deref()
    }

    /// Returns the overlay watch, if armed.
    #[must_use]
    pub const fn watch(&self) -> Option<&WatchSubscription> {
        self.watch.as_ref()
    }

    /// Returns `true` if overlay changes are being watched.
    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.watch.is_some()
    }

    /// Records a fatal error in the fatal log.
    pub fn record_fatal(&mut self, message: &str) {
        self.fatal_log.record(message);
    }

    /// Releases scoped resources.
    ///
    /// Closing the fatal log flushes it. Dropping the watch closes the
    /// notification channel, which ends the dispatch loop.
    pub fn finish(mut self) {
        self.fatal_log.close();
    }
}
