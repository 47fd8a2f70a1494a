use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Column text written for a feature the token does not carry.
pub const MISSING_PLACEHOLDER: &str = "~";

/// One token's features at one sequence position, keyed by feature name.
pub type Observation = HashMap<String, FeatureValue>;

/// A single feature value as produced by the upstream feature extractor.
///
/// Deserializes from plain JSON scalars: `null`, booleans, integers,
/// floats and strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FeatureValue {
    #[default]
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl FeatureValue {
    /// Renders the value as a single whitespace-free column.
    ///
    /// Whitespace inside strings becomes `_` and the empty string becomes `_`.
    /// Strings starting with `~` get an extra leading `~`, so only
    /// [`FeatureValue::Missing`] ever renders as the bare placeholder.
    pub fn to_column(&self) -> String {
        match self {
            FeatureValue::Missing => MISSING_PLACEHOLDER.to_string(),
            FeatureValue::Bool(b) => (if *b { "1" } else { "0" }).to_string(),
            FeatureValue::Int(i) => i.to_string(),
            FeatureValue::Float(f) => format!("{f:?}"),
            FeatureValue::Str(s) => {
                if s.is_empty() {
                    return "_".to_string();
                }
                let cleaned: String = s
                    .chars()
                    .map(|c| if c.is_whitespace() { '_' } else { c })
                    .collect();
                if cleaned.starts_with(MISSING_PLACEHOLDER) {
                    format!("{MISSING_PLACEHOLDER}{cleaned}")
                } else {
                    cleaned
                }
            }
        }
    }

    /// Returns the string payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FeatureValue::Str(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for FeatureValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_column())
    }
}

impl From<&str> for FeatureValue {
    fn from(s: &str) -> Self {
        FeatureValue::Str(s.to_string())
    }
}

impl From<String> for FeatureValue {
    fn from(s: String) -> Self {
        FeatureValue::Str(s)
    }
}

impl From<i64> for FeatureValue {
    fn from(i: i64) -> Self {
        FeatureValue::Int(i)
    }
}

impl From<f64> for FeatureValue {
    fn from(f: f64) -> Self {
        FeatureValue::Float(f)
    }
}

impl From<bool> for FeatureValue {
    fn from(b: bool) -> Self {
        FeatureValue::Bool(b)
    }
}

impl<T: Into<FeatureValue>> From<Option<T>> for FeatureValue {
    fn from(v: Option<T>) -> Self {
        v.map_or(FeatureValue::Missing, Into::into)
    }
}

/// Builds an [`Observation`] from `(name, value)` pairs.
///
/// ```
/// use crfprep_core::types::{observation, FeatureValue};
///
/// let obs = observation([("token", FeatureValue::from("dog")), ("len", 3i64.into())]);
/// assert_eq!(obs["len"], FeatureValue::Int(3));
/// ```
pub fn observation<K, I>(pairs: I) -> Observation
where
    K: Into<String>,
    I: IntoIterator<Item = (K, FeatureValue)>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_columns() {
        assert_eq!(FeatureValue::Int(-42).to_column(), "-42");
        assert_eq!(FeatureValue::Float(1.0).to_column(), "1.0");
        assert_eq!(FeatureValue::Float(0.25).to_column(), "0.25");
        assert_eq!(FeatureValue::Bool(true).to_column(), "1");
        assert_eq!(FeatureValue::Bool(false).to_column(), "0");
        assert_eq!(FeatureValue::from("dog").to_column(), "dog");
    }

    #[test]
    fn placeholder_is_unambiguous() {
        assert_eq!(FeatureValue::Missing.to_column(), "~");
        assert_eq!(FeatureValue::from("~").to_column(), "~~");
        assert_eq!(FeatureValue::from("~~").to_column(), "~~~");
        assert_eq!(FeatureValue::from("a~").to_column(), "a~");
    }

    #[test]
    fn strings_never_split_columns() {
        assert_eq!(FeatureValue::from("New York").to_column(), "New_York");
        assert_eq!(FeatureValue::from("a\tb\nc").to_column(), "a_b_c");
        assert_eq!(FeatureValue::from("").to_column(), "_");
    }

    #[test]
    fn option_conversion() {
        assert_eq!(FeatureValue::from(None::<i64>), FeatureValue::Missing);
        assert_eq!(FeatureValue::from(Some("x")), FeatureValue::from("x"));
    }

    #[test]
    fn deserializes_json_scalars() {
        let obs: Observation =
            serde_json::from_str(r#"{"a": null, "b": true, "c": 7, "d": 2.5, "e": "x"}"#).unwrap();
        assert_eq!(obs["a"], FeatureValue::Missing);
        assert_eq!(obs["b"], FeatureValue::Bool(true));
        assert_eq!(obs["c"], FeatureValue::Int(7));
        assert_eq!(obs["d"], FeatureValue::Float(2.5));
        assert_eq!(obs["e"], FeatureValue::from("x"));
    }
}
