//! Typed snapshot of the merged configuration.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

use super::key::ConfigKey;
use super::layer::Layer;
use super::value::Value;

/// Every configuration value, read from one consistent merged view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Base phenix directory
    #[serde(rename = "base-dir.phenix")]
    pub phenix_base_dir: PathBuf,

    /// Base minimega directory
    #[serde(rename = "base-dir.minimega")]
    pub minimega_base_dir: PathBuf,

    /// Hostname suffixes to strip
    #[serde(rename = "hostname-suffixes")]
    pub hostname_suffixes: Vec<String>,

    /// Storage service endpoint URI
    #[serde(rename = "store.endpoint")]
    pub store_endpoint: String,

    /// General log file
    #[serde(rename = "log.file")]
    pub log_file: PathBuf,

    /// Fatal error log file
    #[serde(rename = "log.error-file")]
    pub error_file: PathBuf,

    /// Also write fatal errors to stderr
    #[serde(rename = "log.error-stderr")]
    pub error_stderr: bool,

    /// Accounts known to the web UI
    #[serde(rename = "ui.users")]
    pub users: Vec<String>,
}

impl Settings {
    /// Builds a snapshot from a merged layer.
    ///
    /// Keys missing from `merged` read as empty values.
    #[must_use]
    pub fn from_layer(merged: &Layer) -> Self {
        let string = |key| {
            merged
                .get(key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let list = |key| {
            merged
                .get(key)
                .and_then(Value::as_list)
                .map(<[String]>::to_vec)
                .unwrap_or_default()
        };

        Self {
            phenix_base_dir: string(ConfigKey::PhenixBaseDir).into(),
            minimega_base_dir: string(ConfigKey::MinimegaBaseDir).into(),
            hostname_suffixes: list(ConfigKey::HostnameSuffixes),
            store_endpoint: string(ConfigKey::StoreEndpoint),
            log_file: string(ConfigKey::LogFile).into(),
            error_file: string(ConfigKey::ErrorFile).into(),
            error_stderr: merged
                .get(ConfigKey::ErrorStderr)
                .and_then(Value::as_bool)
                .unwrap_or_default(),
            users: list(ConfigKey::UiUsers),
        }
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ base-dir.phenix: {}, base-dir.minimega: {}, hostname-suffixes: [{}], \
             store.endpoint: {}, log.file: {}, log.error-file: {}, log.error-stderr: {}, \
             ui.users: {} }}",
            self.phenix_base_dir.display(),
            self.minimega_base_dir.display(),
            self.hostname_suffixes.join(","),
            self.store_endpoint,
            self.log_file.display(),
            self.error_file.display(),
            self.error_stderr,
            self.users.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::defaults;
    use crate::identity::Invocation;

    #[test]
    fn from_default_layer() {
        let settings = Settings::from_layer(&defaults::layer(Invocation::Superuser));

        assert_eq!(settings.phenix_base_dir, PathBuf::from("/phenix"));
        assert_eq!(settings.store_endpoint, defaults::SYSTEM_STORE_ENDPOINT);
        assert!(settings.error_stderr);
        assert!(settings.users.is_empty());
    }

    #[test]
    fn missing_keys_read_as_empty() {
        let settings = Settings::from_layer(&Layer::new());

        assert_eq!(settings.store_endpoint, "");
        assert!(!settings.error_stderr);
        assert!(settings.hostname_suffixes.is_empty());
    }

    #[test]
    fn serializes_with_key_names() {
        let settings = Settings::from_layer(&defaults::layer(Invocation::Superuser));

        let json = serde_json::to_value(&settings).unwrap();

        assert_eq!(json["store.endpoint"], defaults::SYSTEM_STORE_ENDPOINT);
        assert_eq!(json["log.error-stderr"], true);
        assert_eq!(json["hostname-suffixes"], serde_json::json!(["-minimega", "-phenix"]));
        assert_eq!(json["ui.users"], serde_json::json!([]));
    }

    #[test]
    fn display_summarizes_users() {
        let layer = defaults::layer(Invocation::Superuser).with(
            ConfigKey::UiUsers,
            Value::List(vec!["alice".to_string(), "bob".to_string()]),
        );

        let display = Settings::from_layer(&layer).to_string();

        assert!(display.contains("store.endpoint: bolt:///etc/phenix/store.bdb"));
        assert!(display.contains("ui.users: 2"));
    }
}
