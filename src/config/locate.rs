//! Config file search paths.

use std::path::{Path, PathBuf};

use crate::identity::EffectiveIdentity;

use super::defaults::SYSTEM_CONFIG_DIR;
use super::key::APP_NAME;
use super::layer::FileRole;

/// Supported config file extensions, in lookup order within a directory.
pub const EXTENSIONS: [&str; 4] = ["toml", "json", "yaml", "yml"];

/// Ordered directories searched for config files.
///
/// The order is: current directory, `<home>/.config/phenix` (only when the
/// home directory is known), then `/etc/phenix`. Every file role uses the
/// same directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    /// Computes the search path for an identity. Performs no I/O.
    #[must_use]
    pub fn for_identity(identity: &EffectiveIdentity) -> Self {
        let mut dirs = vec![PathBuf::from(".")];

        if let Some(home) = identity.home_dir() {
            dirs.push(home.join(".config").join(APP_NAME));
        }

        dirs.push(PathBuf::from(SYSTEM_CONFIG_DIR));

        Self { dirs }
    }

    /// Creates a search path over explicit directories.
    #[must_use]
    pub fn from_dirs(dirs: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            dirs: dirs.into_iter().collect(),
        }
    }

    /// Returns the candidate directories in precedence order.
    #[must_use]
    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Finds the file for `role`.
    ///
    /// The first directory containing a `<stem>.<ext>` file wins, even if a
    /// later directory also has one.
    #[must_use]
    pub fn find(&self, role: FileRole) -> Option<PathBuf> {
        self.dirs.iter().find_map(|dir| find_in(dir, role))
    }
}

fn find_in(dir: &Path, role: FileRole) -> Option<PathBuf> {
    EXTENSIONS
        .iter()
        .map(|ext| dir.join(format!("{}.{ext}", role.stem())))
        .find(|candidate| candidate.is_file())
}
