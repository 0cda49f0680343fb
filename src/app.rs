//! Application startup and utilities.
//!
//! This module contains exit codes, tracing setup, and error hints
//! that support the main entry point.

use phenix::bootstrap::BootstrapError;
use phenix::config::{ConfigError, ConfigKey};
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Application exit codes.
pub mod exit_code {
    use std::process::ExitCode;

    /// Success (exit code 0).
    pub const SUCCESS: ExitCode = ExitCode::SUCCESS;

    /// Configuration error (exit code 1) - unknown identity, unreadable or
    /// malformed config file, invalid value.
    pub const CONFIG_ERROR: ExitCode = ExitCode::FAILURE;

    /// Runtime error (exit code 2) - storage or log initialization, signal
    /// handling.
    ///
    /// Note: This is a function rather than a constant because `ExitCode::from()` is not `const fn`.
    pub fn runtime_error() -> ExitCode {
        ExitCode::from(2)
    }
}

/// Returns `true` if `error` should exit with [`exit_code::CONFIG_ERROR`].
pub const fn is_config_error(error: &BootstrapError) -> bool {
    matches!(
        error,
        BootstrapError::Identity(_) | BootstrapError::Config(_)
    )
}

/// Prints helpful hints for common configuration errors.
pub fn print_config_hint(error: &ConfigError) {
    match error {
        ConfigError::FileParse { path, .. } => {
            eprintln!(
                "\nFix or remove '{}', or run 'phenix init' to generate a template.",
                path.display()
            );
        }
        ConfigError::InvalidValue { key, .. } => {
            eprintln!(
                "\n'{key}' can be set in config.*, users.*, ${} or --{key}.",
                key.env_var()
            );
            if *key == ConfigKey::ErrorStderr {
                eprintln!("Accepted booleans: 1, t, T, TRUE, true, True, 0, f, F, FALSE, false, False.");
            }
        }
        _ => {}
    }
}

/// Sets up the tracing subscriber for logging.
pub fn setup_tracing(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
