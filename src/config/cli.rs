//! CLI argument parsing using clap.
//!
//! Defines the command-line interface with all options and subcommands.
//! Every config flag is optional: a flag the invoker does not pass leaves
//! the key to lower-precedence sources.

use std::path::PathBuf;

use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};

use super::ConfigError;
use super::key::ConfigKey;
use super::layer::Layer;
use super::value::Value;

/// Keys settable with a command-line flag. The flag is `--<key name>`.
pub const FLAG_KEYS: [ConfigKey; 7] = [
    ConfigKey::PhenixBaseDir,
    ConfigKey::MinimegaBaseDir,
    ConfigKey::HostnameSuffixes,
    ConfigKey::StoreEndpoint,
    ConfigKey::LogFile,
    ConfigKey::ErrorFile,
    ConfigKey::ErrorStderr,
];

/// A cli application for phēnix
#[derive(Debug, Parser)]
#[command(name = "phenix")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Option<Command>,

    /// base phenix directory
    #[arg(id = "base-dir.phenix", long = "base-dir.phenix", value_name = "DIR", global = true)]
    pub phenix_base_dir: Option<String>,

    /// base minimega directory
    #[arg(id = "base-dir.minimega", long = "base-dir.minimega", value_name = "DIR", global = true)]
    pub minimega_base_dir: Option<String>,

    /// hostname suffixes to strip (comma-separated)
    #[arg(id = "hostname-suffixes", long = "hostname-suffixes", value_name = "LIST", global = true)]
    pub hostname_suffixes: Option<String>,

    /// endpoint for storage service
    #[arg(id = "store.endpoint", long = "store.endpoint", value_name = "URI", global = true)]
    pub store_endpoint: Option<String>,

    /// general log file
    #[arg(id = "log.file", long = "log.file", value_name = "PATH", global = true)]
    pub log_file: Option<String>,

    /// log fatal errors to file
    #[arg(id = "log.error-file", long = "log.error-file", value_name = "PATH", global = true)]
    pub error_file: Option<String>,

    /// log fatal errors to STDERR
    #[arg(
        id = "log.error-stderr",
        long = "log.error-stderr",
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true",
        global = true
    )]
    pub error_stderr: Option<bool>,

    /// Enable verbose logging
    #[arg(long, short, global = true)]
    pub verbose: bool,
}

/// Subcommands for phenix
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Generate a default configuration file
    Init {
        /// Output path for the configuration file
        #[arg(long, short, default_value = "config.toml")]
        output: PathBuf,
    },

    /// Print the effective configuration
    Show {
        /// Print the merged values as JSON
        #[arg(long)]
        json: bool,
    },

    /// Serve the web UI user list, reloading it when users.* changes
    Ui,
}

impl Cli {
    /// Parses CLI arguments from the command line, showing `defaults` in
    /// `--help`.
    #[must_use]
    pub fn parse_args(defaults: &Layer) -> Self {
        let matches = Self::command_with_defaults(defaults).get_matches();
        Self::from_arg_matches(&matches).unwrap_or_else(|e| e.exit())
    }

    /// Parses CLI arguments from an iterator (useful for testing).
    pub fn parse_from_iter<I, T>(iter: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Self::parse_from(iter)
    }

    /// Parses CLI arguments from an iterator, showing `defaults` in help.
    ///
    /// # Errors
    ///
    /// Returns clap's error for invalid arguments, `--help` and `--version`.
    pub fn try_parse_with_defaults<I, T>(defaults: &Layer, iter: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        let matches = Self::command_with_defaults(defaults).try_get_matches_from(iter)?;
        Self::from_arg_matches(&matches)
    }

    /// Builds the clap command with `[default: ...]` appended to each flag's
    /// help. Defaults are only displayed; unpassed flags stay `None`.
    #[must_use]
    pub fn command_with_defaults(defaults: &Layer) -> clap::Command {
        FLAG_KEYS.iter().fold(Self::command(), |cmd, key| {
            let Some(value) = defaults.get(*key) else {
                return cmd;
            };
            let shown = value.to_string();

            cmd.mut_arg(key.name(), move |arg| {
                let help = arg.get_help().map(ToString::to_string).unwrap_or_default();
                arg.help(format!("{help} [default: {shown}]"))
            })
        })
    }

    /// Collects explicitly passed flags into the flag layer.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if a flag does not parse as its
    /// key's type.
    pub fn flag_layer(&self) -> Result<Layer, ConfigError> {
        let mut layer = Layer::new();

        let strings = [
            (ConfigKey::PhenixBaseDir, &self.phenix_base_dir),
            (ConfigKey::MinimegaBaseDir, &self.minimega_base_dir),
            (ConfigKey::HostnameSuffixes, &self.hostname_suffixes),
            (ConfigKey::StoreEndpoint, &self.store_endpoint),
            (ConfigKey::LogFile, &self.log_file),
            (ConfigKey::ErrorFile, &self.error_file),
        ];

        for (key, raw) in strings {
            let Some(raw) = raw else { continue };
            let value = Value::parse(key.kind(), raw).map_err(|reason| ConfigError::InvalidValue {
                key,
                origin: format!("flag --{key}"),
                reason,
            })?;
            layer.insert(key, value);
        }

        if let Some(enabled) = self.error_stderr {
            layer.insert(ConfigKey::ErrorStderr, Value::Bool(enabled));
        }

        Ok(layer)
    }
}
