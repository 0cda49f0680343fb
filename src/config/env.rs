//! Environment variable overrides.

use super::ConfigError;
use super::key::ConfigKey;
use super::layer::Layer;
use super::value::Value;

/// Builds the environment layer using `lookup` to read variables.
///
/// Each key is read from [`ConfigKey::env_var`]. Unset and empty variables
/// contribute nothing.
///
/// # Errors
///
/// Returns [`ConfigError::InvalidValue`] if a variable does not parse as its
/// key's type.
pub fn layer<F>(lookup: F) -> Result<Layer, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut layer = Layer::new();

    for key in ConfigKey::ALL {
        let var = key.env_var();
        let Some(raw) = lookup(&var).filter(|raw| !raw.is_empty()) else {
            continue;
        };

        let value = Value::parse(key.kind(), &raw).map_err(|reason| ConfigError::InvalidValue {
            key,
            origin: format!("environment variable {var}"),
            reason,
        })?;

        tracing::debug!("{key} overridden by {var}");
        layer.insert(key, value);
    }

    Ok(layer)
}

/// Reads variables from the process environment.
#[must_use]
pub fn process_env(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn picks_up_prefixed_variables() {
        let layer = layer(env(&[
            ("PHENIX_STORE_ENDPOINT", "etcd://localhost:2379"),
            ("PHENIX_LOG_ERROR_STDERR", "false"),
            ("PHENIX_UI_USERS", "alice,bob"),
        ]))
        .unwrap();

        assert_eq!(
            layer.get(ConfigKey::StoreEndpoint),
            Some(&Value::String("etcd://localhost:2379".to_string()))
        );
        assert_eq!(layer.get(ConfigKey::ErrorStderr), Some(&Value::Bool(false)));
        assert_eq!(
            layer.get(ConfigKey::UiUsers),
            Some(&Value::List(vec!["alice".to_string(), "bob".to_string()]))
        );
        assert_eq!(layer.len(), 3);
    }

    #[test]
    fn unprefixed_and_empty_variables_are_ignored() {
        let layer = layer(env(&[
            ("STORE_ENDPOINT", "etcd://x"),
            ("PHENIX_LOG_FILE", ""),
        ]))
        .unwrap();

        assert!(layer.is_empty());
    }

    #[test]
    fn invalid_bool_names_the_variable() {
        let result = layer(env(&[("PHENIX_LOG_ERROR_STDERR", "maybe")]));

        match result {
            Err(ConfigError::InvalidValue { key, origin, .. }) => {
                assert_eq!(key, ConfigKey::ErrorStderr);
                assert!(origin.contains("PHENIX_LOG_ERROR_STDERR"));
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
