//! Startup loading of every configuration source.

use std::path::PathBuf;

use super::ConfigError;
use super::env;
use super::file;
use super::layer::{FileRole, Layer};
use super::locate::SearchPath;
use super::registry::{ConfigRegistry, Sources};

/// Result of loading configuration at startup.
#[derive(Debug)]
pub struct Loaded {
    /// The merged configuration
    pub registry: ConfigRegistry,
    /// Directories that were searched for config files
    pub search: SearchPath,
    /// Primary config file, if one was found
    pub primary_path: Option<PathBuf>,
    /// Overlay config file, if one was found
    pub overlay_path: Option<PathBuf>,
}

impl Loaded {
    /// Returns `true` if the overlay file was found, i.e. live reload
    /// applies.
    #[must_use]
    pub const fn has_overlay(&self) -> bool {
        self.overlay_path.is_some()
    }
}

/// Loads all sources and merges them.
///
/// `env_lookup` reads environment variables; pass [`env::process_env`] for
/// the real environment.
///
/// # Errors
///
/// Returns an error if a located config file cannot be read or parsed, or
/// an environment variable or flag has an invalid value. Missing files are
/// not errors.
pub fn load<F>(
    search: SearchPath,
    defaults: Layer,
    flags: Layer,
    env_lookup: F,
) -> Result<Loaded, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let (primary_path, primary) = split(load_role(&search, FileRole::Primary)?);
    let (overlay_path, overlay) = split(load_role(&search, FileRole::Overlay)?);
    let environment = env::layer(env_lookup)?;

    let sources = Sources {
        defaults,
        primary,
        overlay,
        environment,
        flags,
    };

    Ok(Loaded {
        registry: ConfigRegistry::new(sources),
        search,
        primary_path,
        overlay_path,
    })
}

/// A located and parsed config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleFile {
    /// Where the file was found
    pub path: PathBuf,
    /// Its parsed contents
    pub layer: Layer,
}

/// Locates and parses the file for `role`.
///
/// Returns `Ok(None)` if no search directory has the file. A malformed file
/// is an error; the search does not continue to later directories.
///
/// # Errors
///
/// Returns an error if the located file cannot be read or parsed.
pub fn load_role(search: &SearchPath, role: FileRole) -> Result<Option<RoleFile>, ConfigError> {
    let Some(path) = search.find(role) else {
        tracing::debug!("No {role} file found in {}", display_dirs(search.dirs()));
        return Ok(None);
    };

    let layer = file::load(&path)?;
    tracing::info!("Loaded {role} file {} ({} keys)", path.display(), layer.len());

    Ok(Some(RoleFile { path, layer }))
}

fn split(found: Option<RoleFile>) -> (Option<PathBuf>, Layer) {
    found.map_or_else(
        || (None, Layer::new()),
        |found| (Some(found.path), found.layer),
    )
}

fn display_dirs(dirs: &[PathBuf]) -> String {
    dirs.iter()
        .map(|dir| dir.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
