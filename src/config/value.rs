//! Typed configuration values and coercion from raw sources.

use std::fmt;

use super::key::ValueKind;

/// A configuration value, already coerced to its key's declared type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A string value
    String(String),
    /// A boolean value
    Bool(bool),
    /// A list of strings
    List(Vec<String>),
}

impl Value {
    /// Returns the string, or `None` for other kinds.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, or `None` for other kinds.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the list, or `None` for other kinds.
    #[must_use]
    pub fn as_list(&self) -> Option<&[String]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Parses a raw string (environment variable or flag) as `kind`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem if `raw` is not a valid `kind`.
    pub fn parse(kind: ValueKind, raw: &str) -> Result<Self, String> {
        match kind {
            ValueKind::String => Ok(Self::String(raw.to_string())),
            ValueKind::Bool => parse_bool(raw).map(Self::Bool),
            ValueKind::StringList => Ok(Self::List(split_list(raw))),
        }
    }

    /// Coerces a structured file value as `kind`.
    ///
    /// # Errors
    ///
    /// Returns a description of the problem on a type mismatch.
    pub fn from_structured(kind: ValueKind, value: &serde_json::Value) -> Result<Self, String> {
        use serde_json::Value as Json;

        match (kind, value) {
            (ValueKind::String, Json::String(s)) => Ok(Self::String(s.clone())),
            (ValueKind::String, Json::Number(n)) => Ok(Self::String(n.to_string())),
            (ValueKind::String, Json::Bool(b)) => Ok(Self::String(b.to_string())),
            (ValueKind::Bool, Json::Bool(b)) => Ok(Self::Bool(*b)),
            (ValueKind::Bool, Json::String(s)) => parse_bool(s).map(Self::Bool),
            (ValueKind::StringList, Json::String(s)) => Ok(Self::List(split_list(s))),
            (ValueKind::StringList, Json::Array(items)) => items
                .iter()
                .map(|item| match item {
                    Json::String(s) => Ok(s.clone()),
                    other => Err(format!("expected list of strings, found {}", json_type(other))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Self::List),
            (kind, other) => Err(format!("expected {kind}, found {}", json_type(other))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
            Self::List(items) => f.write_str(&items.join(",")),
        }
    }
}

/// Accepts `1 t T TRUE true True` and `0 f F FALSE false False`.
fn parse_bool(raw: &str) -> Result<bool, String> {
    match raw {
        "1" | "t" | "T" | "TRUE" | "true" | "True" => Ok(true),
        "0" | "f" | "F" | "FALSE" | "false" | "False" => Ok(false),
        _ => Err(format!("invalid boolean '{raw}'")),
    }
}

/// Splits on commas and whitespace, dropping empty entries.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

const fn json_type(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "table",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod parse {
        use super::*;

        #[test]
        fn bool_accepts_go_spellings() {
            for raw in ["1", "t", "T", "TRUE", "true", "True"] {
                assert_eq!(Value::parse(ValueKind::Bool, raw), Ok(Value::Bool(true)));
            }
            for raw in ["0", "f", "F", "FALSE", "false", "False"] {
                assert_eq!(Value::parse(ValueKind::Bool, raw), Ok(Value::Bool(false)));
            }
        }

        #[test]
        fn bool_rejects_other_spellings() {
            assert!(Value::parse(ValueKind::Bool, "yes").is_err());
            assert!(Value::parse(ValueKind::Bool, "").is_err());
        }

        #[test]
        fn list_splits_on_commas_and_whitespace() {
            assert_eq!(
                Value::parse(ValueKind::StringList, "alice, bob carol,,"),
                Ok(Value::List(vec![
                    "alice".to_string(),
                    "bob".to_string(),
                    "carol".to_string()
                ]))
            );
        }

        #[test]
        fn string_is_taken_verbatim() {
            assert_eq!(
                Value::parse(ValueKind::String, " bolt:///tmp/x.bdb "),
                Ok(Value::String(" bolt:///tmp/x.bdb ".to_string()))
            );
        }
    }

    mod structured {
        use super::*;

        #[test]
        fn list_from_array() {
            let value = Value::from_structured(ValueKind::StringList, &json!(["a", "b"]));
            assert_eq!(value, Ok(Value::List(vec!["a".to_string(), "b".to_string()])));
        }

        #[test]
        fn list_with_non_string_item_is_rejected() {
            let err = Value::from_structured(ValueKind::StringList, &json!(["a", 1])).unwrap_err();
            assert!(err.contains("number"));
        }

        #[test]
        fn bool_from_string() {
            assert_eq!(
                Value::from_structured(ValueKind::Bool, &json!("false")),
                Ok(Value::Bool(false))
            );
        }

        #[test]
        fn string_from_number() {
            assert_eq!(
                Value::from_structured(ValueKind::String, &json!(42)),
                Ok(Value::String("42".to_string()))
            );
        }

        #[test]
        fn table_for_string_is_rejected() {
            let err = Value::from_structured(ValueKind::String, &json!({"a": 1})).unwrap_err();
            assert_eq!(err, "expected string, found table");
        }
    }

    #[test]
    fn display_joins_lists() {
        let value = Value::List(vec!["-minimega".to_string(), "-phenix".to_string()]);
        assert_eq!(value.to_string(), "-minimega,-phenix");
    }
}
