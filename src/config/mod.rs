//! Configuration layer for phenix.
//!
//! This module provides:
//! - The fixed key set ([`ConfigKey`]) and typed values ([`Value`])
//! - CLI argument parsing ([`Cli`], [`Command`])
//! - Config file search ([`SearchPath`]) and parsing ([`file`])
//! - Environment overrides ([`env`])
//! - The merged, shared view ([`ConfigRegistry`], [`Settings`])
//! - Default values ([`defaults`])
//!
//! # Priority
//!
//! Configuration values are resolved with the following priority (highest to lowest):
//!
//! 1. **Explicit CLI arguments** - Flags actually passed on the command line
//! 2. **Environment variables** - `PHENIX_<KEY>`, with `.` and `-` replaced by `_`
//! 3. **Overlay config file** - `users.toml` / `users.json`
//! 4. **Primary config file** - `config.toml` / `config.json`
//! 5. **Built-in defaults** - Depend on whether the effective user is root
//!
//! Replacement is per key: a higher layer that does not define a key leaves
//! it to the layers below. Lists are replaced, never concatenated.
//!
//! # File Lookup
//!
//! Both files are searched for in `./`, `~/.config/phenix/` and
//! `/etc/phenix/`, in that order. The first directory that has the file
//! wins; a malformed file there is an error rather than a reason to keep
//! searching.

mod cli;
pub mod defaults;
pub mod env;
mod error;
pub mod file;
mod key;
mod layer;
mod loader;
mod locate;
mod registry;
mod settings;
mod value;

#[cfg(test)]
mod registry_tests;

pub use cli::{Cli, Command, FLAG_KEYS};
pub use error::ConfigError;
pub use file::default_config_template;
pub use key::{APP_NAME, ConfigKey, ENV_PREFIX, ValueKind};
pub use layer::{FileRole, Layer, SourceLayer};
pub use loader::{Loaded, RoleFile, load, load_role};
pub use locate::{EXTENSIONS, SearchPath};
pub use registry::{ConfigRegistry, OverlayUpdate, Sources};
pub use settings::Settings;
pub use value::Value;

/// Writes the default configuration template to a file.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &std::path::Path) -> Result<(), ConfigError> {
    let template = default_config_template();
    std::fs::write(path, template).map_err(|e| ConfigError::FileWrite {
        path: path.to_path_buf(),
        source: e,
    })
}
