//! Dynamically typed input values as seen by an estimator.

use std::collections::{BTreeMap, HashMap};
use std::hash::BuildHasher;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One node input value.
///
/// Deserializes from JSON untagged: `null` is [`InputValue::Undefined`],
/// numbers are [`InputValue::Number`], strings are [`InputValue::Text`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InputValue {
    /// The input exists but has no value yet.
    Undefined,
    /// A boolean flag.
    Bool(bool),
    /// A number.
    Number(f64),
    /// Text, usually a file path.
    Text(String),
    /// An ordered list of values.
    List(Vec<InputValue>),
    /// A keyed record.
    Record(BTreeMap<String, InputValue>),
}

impl InputValue {
    /// Builds a list of path values.
    pub fn paths<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        InputValue::List(
            paths
                .into_iter()
                .map(|p| InputValue::Text(p.into().to_string_lossy().into_owned()))
                .collect(),
        )
    }

    /// A short name of the variant for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            InputValue::Undefined => "undefined",
            InputValue::Bool(_) => "bool",
            InputValue::Number(_) => "number",
            InputValue::Text(_) => "text",
            InputValue::List(_) => "list",
            InputValue::Record(_) => "record",
        }
    }
}

impl From<f64> for InputValue {
    fn from(value: f64) -> Self {
        InputValue::Number(value)
    }
}

impl From<i64> for InputValue {
    fn from(value: i64) -> Self {
        InputValue::Number(value as f64)
    }
}

impl From<bool> for InputValue {
    fn from(value: bool) -> Self {
        InputValue::Bool(value)
    }
}

impl From<&str> for InputValue {
    fn from(value: &str) -> Self {
        InputValue::Text(value.to_string())
    }
}

impl From<String> for InputValue {
    fn from(value: String) -> Self {
        InputValue::Text(value)
    }
}

impl<T: Into<InputValue>> From<Vec<T>> for InputValue {
    fn from(values: Vec<T>) -> Self {
        InputValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// Input values keyed by name, in a stable order.
pub type Inputs = BTreeMap<String, InputValue>;

/// Lookup of a node's input values by name.
pub trait InputSource {
    /// Returns the value of `name`, or `None` when the input is not provided.
    fn input(&self, name: &str) -> Option<&InputValue>;
}

impl InputSource for BTreeMap<String, InputValue> {
    fn input(&self, name: &str) -> Option<&InputValue> {
        self.get(name)
    }
}

impl<S: BuildHasher> InputSource for HashMap<String, InputValue, S> {
    fn input(&self, name: &str) -> Option<&InputValue> {
        self.get(name)
    }
}

impl<T: InputSource + ?Sized> InputSource for &T {
    fn input(&self, name: &str) -> Option<&InputValue> {
        (**self).input(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_null_is_undefined() {
        let value: InputValue = serde_json::from_str("null").unwrap();
        assert_eq!(value, InputValue::Undefined);
    }

    #[test]
    fn json_shapes_map_to_variants() {
        let inputs: Inputs = serde_json::from_str(
            r#"{"in_file": "/data/T1.nii", "n": 3, "flag": true,
                "many": ["a.nii", 2.5], "opts": {"k": "v"}}"#,
        )
        .unwrap();
        assert_eq!(inputs["in_file"], InputValue::Text("/data/T1.nii".into()));
        assert_eq!(inputs["n"], InputValue::Number(3.0));
        assert_eq!(inputs["flag"], InputValue::Bool(true));
        assert_eq!(
            inputs["many"],
            InputValue::List(vec!["a.nii".into(), 2.5.into()])
        );
        assert_eq!(inputs["opts"].type_name(), "record");
    }

    #[test]
    fn paths_builds_text_list() {
        let value = InputValue::paths(["/a.nii", "/b.nii"]);
        assert_eq!(value, InputValue::from(vec!["/a.nii", "/b.nii"]));
    }

    #[test]
    fn hash_map_is_an_input_source() {
        let mut inputs = HashMap::new();
        inputs.insert("n".to_string(), InputValue::from(4i64));
        assert_eq!(inputs.input("n"), Some(&InputValue::Number(4.0)));
        assert_eq!(inputs.input("missing"), None);
    }
}
