//! Contracts for the subsystems configured at startup.
//!
//! Bootstrap only talks to storage, the fatal log, the default-config seeder
//! and the web UI's user list through these traits. The bundled
//! implementations are what the `phenix` binary uses.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use thiserror::Error;
use url::Url;

/// Storage schemes accepted by [`EndpointStore`].
pub const STORE_SCHEMES: [&str; 2] = ["bolt", "etcd"];

/// Error type for collaborator initialization.
#[derive(Debug, Error)]
pub enum CollabError {
    /// The storage endpoint is not usable.
    #[error("Invalid storage endpoint '{endpoint}': {reason}")]
    Endpoint {
        /// The endpoint URI as configured
        endpoint: String,
        /// Why it was rejected
        reason: String,
    },

    /// The fatal log file could not be opened.
    #[error("Failed to open log file '{}': {source}", path.display())]
    LogFile {
        /// Path to the log file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },

    /// Seeding default configs failed.
    #[error("Failed to seed default configs: {0}")]
    Seed(String),
}

/// Initializes the storage backend.
pub trait StoreInitializer {
    /// Connects to the store at `endpoint`.
    ///
    /// # Errors
    ///
    /// Any error aborts startup.
    fn init(&self, endpoint: &str) -> Result<(), CollabError>;
}

/// Opens the fatal error log.
pub trait FatalLogInitializer {
    /// Opens the log at `path`, optionally mirroring to stderr.
    ///
    /// # Errors
    ///
    /// Any error aborts startup.
    fn init(&self, path: &Path, also_stderr: bool) -> Result<Box<dyn FatalLog>, CollabError>;
}

/// An open fatal error log. Released by [`FatalLog::close`] at exit.
pub trait FatalLog: Send {
    /// Records a fatal error.
    fn record(&mut self, message: &str);

    /// Flushes and releases the log.
    fn close(&mut self);
}

/// Seeds default configs once storage is ready.
pub trait ConfigSeeder {
    /// # Errors
    ///
    /// Any error aborts startup.
    fn seed(&self) -> Result<(), CollabError>;
}

/// Receives the list of web UI accounts.
///
/// Called once at startup when the overlay file exists, then again after
/// every overlay reload that changed something.
pub trait UserListConsumer: Send + Sync {
    /// Replaces the known accounts with `users`.
    fn configure_users(&self, users: &[String]);
}

/// Validates `bolt://` and `etcd://` storage endpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct EndpointStore;

impl StoreInitializer for EndpointStore {
    fn init(&self, endpoint: &str) -> Result<(), CollabError> {
        let invalid = |reason: String| CollabError::Endpoint {
            endpoint: endpoint.to_string(),
            reason,
        };

        let url = Url::parse(endpoint).map_err(|e| invalid(e.to_string()))?;

        match url.scheme() {
            "bolt" if url.path().is_empty() || url.path() == "/" => {
                Err(invalid("bolt endpoint needs a database path".to_string()))
            }
            "etcd" if url.host_str().is_none_or(str::is_empty) => Err(invalid("etcd endpoint needs a host".to_string())),
            scheme if STORE_SCHEMES.contains(&scheme) => {
                tracing::info!("Using {scheme} store at {endpoint}");
                Ok(())
            }
            scheme => Err(invalid(format!(
                "unsupported scheme '{scheme}', expected one of: {}",
                STORE_SCHEMES.join(", ")
            ))),
        }
    }
}

/// Opens fatal logs as append-only files.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileFatalLogWriter;

impl FatalLogInitializer for FileFatalLogWriter {
    fn init(&self, path: &Path, also_stderr: bool) -> Result<Box<dyn FatalLog>, CollabError> {
        let log_error = |source| CollabError::LogFile {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(log_error)?;
            }
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(log_error)?;

        Ok(Box::new(FileFatalLog {
            writer: Some(BufWriter::new(file)),
            also_stderr,
        }))
    }
}

/// Fatal log backed by a file.
#[derive(Debug)]
pub struct FileFatalLog {
    writer: Option<BufWriter<File>>,
    also_stderr: bool,
}

impl FatalLog for FileFatalLog {
    fn record(&mut self, message: &str) {
        if self.also_stderr {
            eprintln!("{message}");
        }

        if let Some(writer) = self.writer.as_mut() {
            let line = format!("{} {message}\n", unix_timestamp_now());
            if let Err(e) = writer.write_all(line.as_bytes()) {
                tracing::warn!("Failed to write fatal log: {e}");
            }
        }
    }

    fn close(&mut self) {
        if let Some(mut writer) = self.writer.take() {
            if let Err(e) = writer.flush() {
                tracing::warn!("Failed to flush fatal log: {e}");
            }
        }
    }
}

impl Drop for FileFatalLog {
    fn drop(&mut self) {
        self.close();
    }
}

fn unix_timestamp_now() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Seeder for when storage needs no default documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSeeder;

impl ConfigSeeder for NoopSeeder {
    fn seed(&self) -> Result<(), CollabError> {
        tracing::debug!("Default configs ready");
        Ok(())
    }
}

/// The web UI's current list of accounts.
#[derive(Debug, Default)]
pub struct UserDirectory {
    users: RwLock<Vec<String>>,
}

impl UserDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current accounts.
    #[must_use]
    pub fn users(&self) -> Vec<String> {
        self.users
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl UserListConsumer for UserDirectory {
    fn configure_users(&self, users: &[String]) {
        tracing::info!("Configured {} UI user(s): {}", users.len(), users.join(", "));
        *self.users.write().unwrap_or_else(PoisonError::into_inner) = users.to_vec();
    }
}
