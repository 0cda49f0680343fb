//! phēnix
//!
//! Entry point for the phenix application.

use phenix::bootstrap::Bootstrap;
use phenix::config::{Cli, Command, write_default_config};
use phenix::identity;
use std::process::ExitCode;

mod app;
mod run;

use app::{exit_code, print_config_hint, setup_tracing};

/// Main entry point.
///
/// Excluded from coverage as it's the thin wrapper around testable components.
#[cfg(not(tarpaulin_include))]
fn main() -> ExitCode {
    // Defaults depend on who we run as, and `--help` shows them
    let identity = match identity::resolve() {
        Ok(identity) => identity,
        Err(e) => {
            eprintln!("Fatal: {e}");
            return exit_code::CONFIG_ERROR;
        }
    };
    let bootstrap = Bootstrap::new(identity);

    let cli = Cli::parse_args(bootstrap.defaults());

    // Handle init subcommand
    if let Some(Command::Init { output }) = &cli.command {
        return handle_init(output);
    }

    setup_tracing(cli.verbose);

    run_application(&bootstrap, &cli)
}

/// Handles the `init` subcommand.
fn handle_init(output: &std::path::Path) -> ExitCode {
    match write_default_config(output) {
        Ok(()) => {
            println!("Configuration template written to: {}", output.display());
            exit_code::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            exit_code::CONFIG_ERROR
        }
    }
}

/// Runs the selected command after startup.
///
/// Excluded from coverage - requires async runtime.
#[cfg(not(tarpaulin_include))]
fn run_application(bootstrap: &Bootstrap, cli: &Cli) -> ExitCode {
    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to create Tokio runtime: {e}");
            return exit_code::runtime_error();
        }
    };

    match runtime.block_on(run::execute(bootstrap, cli)) {
        Ok(()) => exit_code::SUCCESS,
        Err(run::RunError::Bootstrap(e)) => {
            eprintln!("Fatal: {e}");
            if let phenix::bootstrap::BootstrapError::Config(config_error) = &e {
                print_config_hint(config_error);
            }
            if app::is_config_error(&e) {
                exit_code::CONFIG_ERROR
            } else {
                exit_code::runtime_error()
            }
        }
        Err(e) => {
            tracing::error!("Application error: {e}");
            exit_code::runtime_error()
        }
    }
}
