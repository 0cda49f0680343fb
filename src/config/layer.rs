//! Configuration source layers.

use std::collections::BTreeMap;
use std::fmt;

use super::key::ConfigKey;
use super::value::Value;

/// Which config file a layer came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// The main settings file (`config.*`)
    Primary,
    /// The users overlay file (`users.*`), merged on top of the primary file
    Overlay,
}

impl FileRole {
    /// Returns the base file name (without extension) for this role.
    #[must_use]
    pub const fn stem(self) -> &'static str {
        match self {
            Self::Primary => "config",
            Self::Overlay => "users",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.stem())
    }
}

/// Where a layer's values came from, in increasing precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceLayer {
    /// Compiled-in defaults
    Default,
    /// A config file
    File(FileRole),
    /// `PHENIX_*` environment variables
    Environment,
    /// Explicitly passed command-line flags
    Flag,
}

impl fmt::Display for SourceLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            Self::File(role) => write!(f, "{role} file"),
            Self::Environment => f.write_str("environment"),
            Self::Flag => f.write_str("flag"),
        }
    }
}

/// An immutable mapping from keys to values contributed by one source.
///
/// Keys a source does not define are simply absent, so lookups fall through
/// to lower layers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layer {
    values: BTreeMap<ConfigKey, Value>,
}

impl Layer {
    /// Creates an empty layer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, replacing any previous value for `key`.
    #[must_use]
    pub fn with(mut self, key: ConfigKey, value: Value) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets the value for `key`.
    pub fn insert(&mut self, key: ConfigKey, value: Value) {
        self.values.insert(key, value);
    }

    /// Returns the value this layer defines for `key`.
    #[must_use]
    pub fn get(&self, key: ConfigKey) -> Option<&Value> {
        self.values.get(&key)
    }

    /// Returns `true` if the layer defines no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the number of keys defined.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Copies every value of `upper` over this layer.
    pub fn overlay(&mut self, upper: &Self) {
        for (key, value) in &upper.values {
            self.values.insert(*key, value.clone());
        }
    }
}

impl FromIterator<(ConfigKey, Value)> for Layer {
    fn from_iter<I: IntoIterator<Item = (ConfigKey, Value)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn string(s: &str) -> Value {
        Value::String(s.to_string())
    }

    #[test]
    fn overlay_replaces_only_defined_keys() {
        let mut base = Layer::new()
            .with(ConfigKey::StoreEndpoint, string("bolt:///a"))
            .with(ConfigKey::LogFile, string("/a.log"));
        let upper = Layer::new().with(ConfigKey::StoreEndpoint, string("bolt:///b"));

        base.overlay(&upper);

        assert_eq!(base.get(ConfigKey::StoreEndpoint), Some(&string("bolt:///b")));
        assert_eq!(base.get(ConfigKey::LogFile), Some(&string("/a.log")));
    }

    #[test]
    fn role_stems() {
        assert_eq!(FileRole::Primary.stem(), "config");
        assert_eq!(FileRole::Overlay.stem(), "users");
    }

    #[test]
    fn empty_layer() {
        let layer = Layer::new();
        assert!(layer.is_empty());
        assert_eq!(layer.len(), 0);
        assert_eq!(layer.get(ConfigKey::UiUsers), None);
    }
}
