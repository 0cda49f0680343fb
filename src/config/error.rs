//! Error types for configuration loading.

use std::path::PathBuf;

use thiserror::Error;

use super::key::ConfigKey;

/// Error type for configuration operations.
///
/// A missing config file is never an error; these cover files that exist
/// but cannot be used, and values that do not fit their key's type.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read a located configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A located configuration file is not valid TOML, JSON or YAML.
    #[error("Failed to parse config file '{}': {reason}", path.display())]
    FileParse {
        /// Path to the config file
        path: PathBuf,
        /// Parser message
        reason: String,
    },

    /// A value does not fit its key's declared type.
    #[error("Invalid value for {key} from {origin}: {reason}")]
    InvalidValue {
        /// The key being set
        key: ConfigKey,
        /// Where the value came from (file path, env var, flag)
        origin: String,
        /// Why the value was rejected
        reason: String,
    },

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Returns the file path involved in this error, if any.
    #[must_use]
    pub fn path(&self) -> Option<&std::path::Path> {
        match self {
            Self::FileRead { path, .. } | Self::FileParse { path, .. } | Self::FileWrite { path, .. } => {
                Some(path)
            }
            Self::InvalidValue { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn parse_error_names_the_path() {
        let error = ConfigError::FileParse {
            path: PathBuf::from("/etc/phenix/users.toml"),
            reason: "expected `=`".to_string(),
        };

        assert_eq!(
            error.to_string(),
            "Failed to parse config file '/etc/phenix/users.toml': expected `=`"
        );
        assert_eq!(error.path(), Some(std::path::Path::new("/etc/phenix/users.toml")));
    }

    #[test]
    fn invalid_value_names_key_and_origin() {
        let error = ConfigError::InvalidValue {
            key: ConfigKey::ErrorStderr,
            origin: "environment variable PHENIX_LOG_ERROR_STDERR".to_string(),
            reason: "invalid boolean 'maybe'".to_string(),
        };

        let message = error.to_string();
        assert!(message.contains("log.error-stderr"));
        assert!(message.contains("PHENIX_LOG_ERROR_STDERR"));
        assert!(error.path().is_none());
    }

    #[test]
    fn read_error_preserves_source() {
        let error = ConfigError::FileRead {
            path: PathBuf::from("config.toml"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };

        assert!(error.source().unwrap().to_string().contains("denied"));
    }
}
