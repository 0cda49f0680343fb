//! The fixed set of configuration keys.

use std::fmt;

/// Application name used for config directories and file lookups.
pub const APP_NAME: &str = "phenix";

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "PHENIX";

/// Declared type of a configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// A single string
    String,
    /// A boolean
    Bool,
    /// An ordered list of strings
    StringList,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::String => "string",
            Self::Bool => "bool",
            Self::StringList => "string list",
        })
    }
}

/// A configuration key known at compile time.
///
/// Keys are addressed by dotted names (`store.endpoint`) in config files and
/// on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ConfigKey {
    /// Base phenix directory
    PhenixBaseDir,
    /// Base minimega directory
    MinimegaBaseDir,
    /// Hostname suffixes to strip
    HostnameSuffixes,
    /// Storage service endpoint URI
    StoreEndpoint,
    /// General log file
    LogFile,
    /// Fatal error log file
    ErrorFile,
    /// Also write fatal errors to stderr
    ErrorStderr,
    /// Accounts known to the web UI
    UiUsers,
}

impl ConfigKey {
    /// Every key, in display order.
    pub const ALL: [Self; 8] = [
        Self::PhenixBaseDir,
        Self::MinimegaBaseDir,
        Self::HostnameSuffixes,
        Self::StoreEndpoint,
        Self::LogFile,
        Self::ErrorFile,
        Self::ErrorStderr,
        Self::UiUsers,
    ];

    /// Returns the dotted name of this key.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::PhenixBaseDir => "base-dir.phenix",
            Self::MinimegaBaseDir => "base-dir.minimega",
            Self::HostnameSuffixes => "hostname-suffixes",
            Self::StoreEndpoint => "store.endpoint",
            Self::LogFile => "log.file",
            Self::ErrorFile => "log.error-file",
            Self::ErrorStderr => "log.error-stderr",
            Self::UiUsers => "ui.users",
        }
    }

    /// Returns the declared type of this key.
    #[must_use]
    pub const fn kind(self) -> ValueKind {
        match self {
            Self::HostnameSuffixes | Self::UiUsers => ValueKind::StringList,
            Self::ErrorStderr => ValueKind::Bool,
            _ => ValueKind::String,
        }
    }

    /// Looks up a key by its dotted name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.name() == name)
    }

    /// Returns the environment variable that overrides this key.
    ///
    /// `store.endpoint` becomes `PHENIX_STORE_ENDPOINT`.
    #[must_use]
    pub fn env_var(self) -> String {
        let suffix: String = self
            .name()
            .chars()
            .map(|c| match c {
                '.' | '-' => '_',
                c => c.to_ascii_uppercase(),
            })
            .collect();

        format!("{ENV_PREFIX}_{suffix}")
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_var_replaces_dots_and_dashes() {
        assert_eq!(ConfigKey::StoreEndpoint.env_var(), "PHENIX_STORE_ENDPOINT");
        assert_eq!(ConfigKey::ErrorStderr.env_var(), "PHENIX_LOG_ERROR_STDERR");
        assert_eq!(ConfigKey::PhenixBaseDir.env_var(), "PHENIX_BASE_DIR_PHENIX");
        assert_eq!(ConfigKey::HostnameSuffixes.env_var(), "PHENIX_HOSTNAME_SUFFIXES");
    }

    #[test]
    fn from_name_round_trips_every_key() {
        for key in ConfigKey::ALL {
            assert_eq!(ConfigKey::from_name(key.name()), Some(key));
        }
    }

    #[test]
    fn from_name_rejects_unknown() {
        assert_eq!(ConfigKey::from_name("store"), None);
        assert_eq!(ConfigKey::from_name("STORE.ENDPOINT"), None);
    }

    #[test]
    fn declared_kinds() {
        assert_eq!(ConfigKey::UiUsers.kind(), ValueKind::StringList);
        assert_eq!(ConfigKey::ErrorStderr.kind(), ValueKind::Bool);
        assert_eq!(ConfigKey::StoreEndpoint.kind(), ValueKind::String);
    }
}
