//! Default values for configuration options.
//!
//! Paths for storage and logs depend on who is running the command: the
//! superuser gets system-wide locations, everyone else gets files in their
//! home directory.

use std::path::Path;

use crate::identity::Invocation;

use super::key::ConfigKey;
use super::layer::Layer;
use super::value::Value;

/// Default base phenix directory.
pub const PHENIX_BASE_DIR: &str = "/phenix";

/// Default base minimega directory.
pub const MINIMEGA_BASE_DIR: &str = "/tmp/minimega";

/// Default hostname suffixes to strip.
pub const HOSTNAME_SUFFIXES: [&str; 2] = ["-minimega", "-phenix"];

/// Whether fatal errors are also written to stderr by default.
pub const ERROR_STDERR: bool = true;

/// System-wide config directory.
pub const SYSTEM_CONFIG_DIR: &str = "/etc/phenix";

/// System-wide log directory.
pub const SYSTEM_LOG_DIR: &str = "/var/log/phenix";

/// Superuser default storage endpoint.
pub const SYSTEM_STORE_ENDPOINT: &str = "bolt:///etc/phenix/store.bdb";

/// Superuser default general log file.
pub const SYSTEM_LOG_FILE: &str = "/var/log/phenix/phenix.log";

/// Superuser default fatal error log file.
pub const SYSTEM_ERROR_FILE: &str = "/var/log/phenix/error.log";

/// Builds the default layer for the given invocation.
///
/// Every key is present, so merged lookups always resolve.
#[must_use]
pub fn layer(invocation: Invocation<'_>) -> Layer {
    let (endpoint, log_file, error_file) = match invocation {
        Invocation::Superuser => (
            SYSTEM_STORE_ENDPOINT.to_string(),
            SYSTEM_LOG_FILE.to_string(),
            SYSTEM_ERROR_FILE.to_string(),
        ),
        Invocation::User { home } => {
            let home = home.unwrap_or_else(|| Path::new(".")).display();
            (
                format!("bolt://{home}/.phenix.bdb"),
                format!("{home}/.phenix.log"),
                format!("{home}/.phenix.err"),
            )
        }
    };

    Layer::new()
        .with(ConfigKey::PhenixBaseDir, Value::String(PHENIX_BASE_DIR.to_string()))
        .with(ConfigKey::MinimegaBaseDir, Value::String(MINIMEGA_BASE_DIR.to_string()))
        .with(
            ConfigKey::HostnameSuffixes,
            Value::List(HOSTNAME_SUFFIXES.map(str::to_string).to_vec()),
        )
        .with(ConfigKey::StoreEndpoint, Value::String(endpoint))
        .with(ConfigKey::LogFile, Value::String(log_file))
        .with(ConfigKey::ErrorFile, Value::String(error_file))
        .with(ConfigKey::ErrorStderr, Value::Bool(ERROR_STDERR))
        .with(ConfigKey::UiUsers, Value::List(Vec::new()))
}
