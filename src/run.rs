//! Application execution logic.
//!
//! This module starts the session with the bundled collaborators, runs the
//! selected subcommand and releases the fatal log on the way out.

use std::fmt::Write as _;
use std::io;
use std::sync::Arc;

use thiserror::Error;
use tokio::signal;

use phenix::bootstrap::{Bootstrap, BootstrapError, Collaborators, Session};
use phenix::collab::{
    EndpointStore, FileFatalLogWriter, NoopSeeder, UserDirectory, UserListConsumer,
};
use phenix::config::{Cli, Command, ConfigKey, env};

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// Startup failed.
    #[error(transparent)]
    Bootstrap(#[from] BootstrapError),

    /// Failed to print help.
    #[error("Failed to print help: {0}")]
    Help(#[source] io::Error),

    /// Failed to serialize the effective configuration.
    #[error("Failed to render configuration: {0}")]
    Render(#[source] serde_json::Error),

    /// Failed to install the shutdown signal handler.
    #[error("Failed to install signal handler: {0}")]
    Signal(#[source] io::Error),
}

/// Starts the application and runs the selected command.
///
/// Anything that fails after startup is also written to the fatal log.
///
/// # Errors
///
/// Returns an error if startup fails or the command fails.
#[cfg(not(tarpaulin_include))]
pub async fn execute(bootstrap: &Bootstrap, cli: &Cli) -> Result<(), RunError> {
    let flags = cli.flag_layer().map_err(BootstrapError::from)?;
    let users = Arc::new(UserDirectory::new());
    let collaborators = bundled_collaborators(&users);

    let mut session = bootstrap.start(flags, env::process_env, &collaborators)?;
    tracing::info!("{}", session.settings());

    let result = run_command(cli.command.as_ref(), bootstrap, &session, &users).await;

    if let Err(e) = &result {
        session.record_fatal(&e.to_string());
    }
    session.finish();

    result
}

fn bundled_collaborators(users: &Arc<UserDirectory>) -> Collaborators {
    Collaborators {
        store: Box::new(EndpointStore),
        fatal_log: Box::new(FileFatalLogWriter),
        seeder: Box::new(NoopSeeder),
        users: Arc::clone(users) as Arc<dyn UserListConsumer>,
    }
}

#[cfg(not(tarpaulin_include))]
async fn run_command(
    command: Option<&Command>,
    bootstrap: &Bootstrap,
    session: &Session,
    users: &UserDirectory,
) -> Result<(), RunError> {
    match command {
        None => Cli::command_with_defaults(bootstrap.defaults())
            .print_help()
            .map_err(RunError::Help),
        Some(Command::Show { json: true }) => {
            let json = serde_json::to_string_pretty(&session.settings()).map_err(RunError::Render)?;
            println!("{json}");
            Ok(())
        }
        Some(Command::Show { json: false }) => {
            print!("{}", render_settings(session));
            Ok(())
        }
        Some(Command::Ui) => serve_users(session, users).await,
        // Handled before startup.
        Some(Command::Init { .. }) => Ok(()),
    }
}

/// Formats every key with its value and the source it came from.
fn render_settings(session: &Session) -> String {
    let registry = session.registry();
    let mut out = String::new();

    let dirs: Vec<_> = session
        .search()
        .dirs()
        .iter()
        .map(|dir| dir.display().to_string())
        .collect();
    let _ = writeln!(out, "search path: {}", dirs.join(", "));
    for (label, path) in [
        ("config file", session.primary_path()),
        ("users file", session.overlay_path()),
    ] {
        let shown = path.map_or_else(|| "(none)".to_string(), |p| p.display().to_string());
        let _ = writeln!(out, "{label}: {shown}");
    }
    out.push('\n');

    for key in ConfigKey::ALL {
        let value = registry.get(key).map(|v| v.to_string()).unwrap_or_default();
        let origin = registry
            .origin(key)
            .map_or_else(|| "unset".to_string(), |layer| layer.to_string());
        let _ = writeln!(out, "{key:<20} = {value} ({origin})");
    }

    out
}

/// Keeps the user list live until shutdown.
#[cfg(not(tarpaulin_include))]
async fn serve_users(session: &Session, users: &UserDirectory) -> Result<(), RunError> {
    tracing::info!("UI users: [{}]", users.users().join(", "));
    if !session.is_armed() {
        tracing::info!("No users file is being watched; user list is static");
    }

    shutdown_signal().await.map_err(RunError::Signal)?;
    tracing::info!("Shutdown signal received, stopping...");
    Ok(())
}

/// Completes when a shutdown signal is received.
///
/// Excluded from coverage - requires OS signal handling.
#[cfg(not(tarpaulin_include))]
async fn shutdown_signal() -> io::Result<()> {
    #[cfg(unix)]
    {
        let mut terminate = signal::unix::signal(signal::unix::SignalKind::terminate())?;
        tokio::select! {
            result = signal::ctrl_c() => result,
            _ = terminate.recv() => Ok(()),
        }
    }

    #[cfg(not(unix))]
    signal::ctrl_c().await
}
