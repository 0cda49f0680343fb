//! The merged, shared configuration view.
//!
//! Layers are merged in a fixed order, lowest precedence first:
//!
//! 1. **Built-in defaults** (identity dependent)
//! 2. **Primary config file** (`config.*`)
//! 3. **Overlay config file** (`users.*`)
//! 4. **Environment variables** (`PHENIX_*`)
//! 5. **Explicit CLI flags**
//!
//! The registry is shared between the command and the overlay watcher. The
//! overlay is the only layer that changes after startup, and it is swapped
//! together with the merged view under a single write lock.

use std::sync::{PoisonError, RwLock, RwLockReadGuard};

use super::key::ConfigKey;
use super::layer::{FileRole, Layer, SourceLayer};
use super::settings::Settings;
use super::value::Value;

/// The raw layers that make up a configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sources {
    /// Built-in defaults
    pub defaults: Layer,
    /// Primary config file, empty if not found
    pub primary: Layer,
    /// Overlay config file, empty if not found
    pub overlay: Layer,
    /// Environment overrides
    pub environment: Layer,
    /// Explicitly passed flags
    pub flags: Layer,
}

impl Sources {
    /// Returns the layers in precedence order, lowest first.
    #[must_use]
    pub const fn layers(&self) -> [(SourceLayer, &Layer); 5] {
        [
            (SourceLayer::Default, &self.defaults),
            (SourceLayer::File(FileRole::Primary), &self.primary),
            (SourceLayer::File(FileRole::Overlay), &self.overlay),
            (SourceLayer::Environment, &self.environment),
            (SourceLayer::Flag, &self.flags),
        ]
    }

    /// Merges all layers; later layers win key by key.
    #[must_use]
    pub fn merge(&self) -> Layer {
        let mut merged = Layer::new();
        for (_, layer) in self.layers() {
            merged.overlay(layer);
        }
        merged
    }

    /// Returns the highest layer that defines `key`.
    #[must_use]
    pub fn origin(&self, key: ConfigKey) -> Option<SourceLayer> {
        self.layers()
            .into_iter()
            .rev()
            .find(|(_, layer)| layer.get(key).is_some())
            .map(|(source, _)| source)
    }
}

/// Outcome of replacing the overlay layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayUpdate {
    /// The new overlay is identical to the current one; nothing changed.
    Unchanged,
    /// The overlay was replaced and the view re-merged.
    Applied {
        /// Merged `ui.users` after the update
        users: Vec<String>,
    },
}

#[derive(Debug)]
struct State {
    sources: Sources,
    merged: Layer,
}

/// Thread-safe merged configuration.
///
/// Reads always see the fully merged value of a key; individual layers are
/// not exposed.
#[derive(Debug)]
pub struct ConfigRegistry {
    state: RwLock<State>,
}

impl ConfigRegistry {
    /// Creates a registry from its sources.
    #[must_use]
    pub fn new(sources: Sources) -> Self {
        let merged = sources.merge();
        Self {
            state: RwLock::new(State { sources, merged }),
        }
    }

    /// Returns the merged value for `key`.
    #[must_use]
    pub fn get(&self, key: ConfigKey) -> Option<Value> {
        self.read().merged.get(key).cloned()
    }

    /// Returns which source supplied the merged value of `key`.
    #[must_use]
    pub fn origin(&self, key: ConfigKey) -> Option<SourceLayer> {
        self.read().sources.origin(key)
    }

    /// Returns a consistent typed snapshot of every key.
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings::from_layer(&self.read().merged)
    }

    /// Replaces the overlay layer and re-merges.
    ///
    /// Replacing with an identical layer is a no-op and reports
    /// [`OverlayUpdate::Unchanged`].
    pub fn replace_overlay(&self, overlay: Layer) -> OverlayUpdate {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);

        if state.sources.overlay == overlay {
            return OverlayUpdate::Unchanged;
        }

        state.sources.overlay = overlay;
        state.merged = state.sources.merge();

        let users = state
            .merged
            .get(ConfigKey::UiUsers)
            .and_then(Value::as_list)
            .map(<[String]>::to_vec)
            .unwrap_or_default();

        OverlayUpdate::Applied { users }
    }

    fn read(&self) -> RwLockReadGuard<'_, State> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }
}
