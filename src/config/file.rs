//! Config file parsing.
//!
//! Files are TOML, JSON or YAML, chosen by extension. Nested tables are flattened
//! into dotted keys, so these are equivalent:
//!
//! ```toml
//! [store]
//! endpoint = "bolt:///tmp/phenix.bdb"
//! ```
//!
//! ```toml
//! "store.endpoint" = "bolt:///tmp/phenix.bdb"
//! ```
//!
//! Keys that are not part of the fixed key set are ignored.

use std::path::Path;

use serde_json::{Map, Value as Json};

use super::ConfigError;
use super::key::ConfigKey;
use super::layer::Layer;
use super::value::Value;

/// Structured syntax of a config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    /// TOML (`.toml`, and the fallback for unknown extensions)
    Toml,
    /// JSON (`.json`)
    Json,
    /// YAML (`.yaml`, `.yml`)
    Yaml,
}

impl Format {
    /// Picks the format from a file's extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                Self::Yaml
            }
            _ => Self::Toml,
        }
    }
}

/// Reads and parses a config file into a layer.
///
/// # Errors
///
/// Returns an error if the file cannot be read, is not valid for its
/// format, or holds a value that does not fit its key's type.
pub fn load(path: &Path) -> Result<Layer, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse(&content, Format::from_path(path), path)
}

/// Parses config file content into a layer.
///
/// `path` is only used for error messages.
///
/// # Errors
///
/// See [`load`].
pub fn parse(content: &str, format: Format, path: &Path) -> Result<Layer, ConfigError> {
    let parse_error = |reason: String| ConfigError::FileParse {
        path: path.to_path_buf(),
        reason,
    };

    let document: Json = match format {
        Format::Toml => toml::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        Format::Json => serde_json::from_str(content).map_err(|e| parse_error(e.to_string()))?,
        // An empty YAML document is an empty table, as in TOML.
        Format::Yaml => serde_yaml::from_str::<Option<Json>>(content)
            .map_err(|e| parse_error(e.to_string()))?
            .unwrap_or_else(|| Json::Object(Map::new())),
    };

    let Json::Object(root) = document else {
        return Err(parse_error("top level must be a table".to_string()));
    };

    let mut flat = Vec::new();
    flatten("", &root, &mut flat);

    flat.into_iter()
        .filter_map(|(name, raw)| ConfigKey::from_name(&name).map(|key| (key, raw)))
        .map(|(key, raw)| {
            Value::from_structured(key.kind(), raw)
                .map(|value| (key, value))
                .map_err(|reason| ConfigError::InvalidValue {
                    key,
                    origin: path.display().to_string(),
                    reason,
                })
        })
        .collect()
}

/// Flattens nested tables into `(dotted.name, leaf)` pairs.
fn flatten<'a>(prefix: &str, table: &'a Map<String, Json>, out: &mut Vec<(String, &'a Json)>) {
    for (name, value) in table {
        let full = if prefix.is_empty() {
            name.clone()
        } else {
            format!("{prefix}.{name}")
        };

        match value {
            Json::Object(nested) => flatten(&full, nested, out),
            leaf => out.push((full, leaf)),
        }
    }
}

/// Generates a default `config.toml` with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# phenix configuration file
#
# Looked up as config.toml (or .json, .yaml, .yml) in, in order:
#   ./  ~/.config/phenix/  /etc/phenix/
# The first one found is used. Users for the web UI go in a separate
# users.toml next to it; that file is reloaded automatically on change.
#
# Every value can also be set with a PHENIX_* environment variable
# (e.g. PHENIX_STORE_ENDPOINT) or a command-line flag, which take
# precedence over this file.

# hostname-suffixes = ["-minimega", "-phenix"]

[base-dir]
# Base phenix directory (default: /phenix)
# phenix = "/phenix"

# Base minimega directory (default: /tmp/minimega)
# minimega = "/tmp/minimega"

[store]
# Storage service endpoint (bolt:// or etcd://)
# Default: bolt:///etc/phenix/store.bdb as root, bolt://~/.phenix.bdb otherwise
# endpoint = "bolt:///etc/phenix/store.bdb"

[log]
# General log file
# file = "/var/log/phenix/phenix.log"

# Fatal error log file
# error-file = "/var/log/phenix/error.log"

# Also write fatal errors to stderr (default: true)
# error-stderr = true
"#
    .to_string()
}
