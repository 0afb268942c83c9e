//! Field-level shape checks run before typed deserialization.
//!
//! serde stops at the first mismatch; the checker walks the whole document so a single
//! decode failure lists every offending field path.

use indexmap::IndexMap;
use serde::de::{Deserialize, Deserializer, Error as _};
use serde_yaml::{Mapping, Sequence, Value};
use std::fmt;

/// One offending field inside a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

#[derive(Default)]
pub(crate) struct FieldChecker {
    violations: Vec<FieldViolation>,
}

impl FieldChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn violation(&mut self, path: &str, message: impl Into<String>) {
        self.violations.push(FieldViolation::new(path, message));
    }

    pub fn finish(self) -> Result<(), Vec<FieldViolation>> {
        if self.violations.is_empty() {
            Ok(())
        } else {
            Err(self.violations)
        }
    }

    pub fn root<'v>(&mut self, value: &'v Value) -> Option<&'v Mapping> {
        match value {
            Value::Mapping(map) => Some(map),
            other => {
                self.violation("", format!("expected a mapping, got {}", type_name(other)));
                None
            }
        }
    }

    pub fn deny_unknown(&mut self, map: &Mapping, path: &str, allowed: &[&str]) {
        for key in map.keys() {
            match key.as_str() {
                Some(name) if allowed.contains(&name) => {}
                Some(name) => self.violation(&join(path, name), "unknown field"),
                None => self.violation(path, "mapping keys must be strings"),
            }
        }
    }

    pub fn required_mapping<'v>(
        &mut self,
        map: &'v Mapping,
        path: &str,
        key: &str,
    ) -> Option<&'v Mapping> {
        match map.get(key) {
            None => {
                self.violation(&join(path, key), "field required");
                None
            }
            Some(value) => self.expect_mapping(value, &join(path, key)),
        }
    }

    pub fn optional_mapping<'v>(
        &mut self,
        map: &'v Mapping,
        path: &str,
        key: &str,
    ) -> Option<&'v Mapping> {
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(value) => self.expect_mapping(value, &join(path, key)),
        }
    }

    pub fn optional_sequence<'v>(
        &mut self,
        map: &'v Mapping,
        path: &str,
        key: &str,
    ) -> Option<&'v Sequence> {
        match map.get(key) {
            None | Some(Value::Null) => None,
            Some(Value::Sequence(items)) => Some(items),
            Some(other) => {
                self.violation(
                    &join(path, key),
                    format!("expected a sequence, got {}", type_name(other)),
                );
                None
            }
        }
    }

    pub fn required_string(&mut self, map: &Mapping, path: &str, key: &str) {
        match map.get(key) {
            None => self.violation(&join(path, key), "field required"),
            Some(value) => self.expect_string(value, &join(path, key)),
        }
    }

    pub fn optional_string(&mut self, map: &Mapping, path: &str, key: &str) {
        match map.get(key) {
            None | Some(Value::Null) => {}
            Some(value) => self.expect_string(value, &join(path, key)),
        }
    }

    /// Optional mapping of string keys to scalar values.
    pub fn scalar_map(&mut self, map: &Mapping, path: &str, key: &str) {
        let field = join(path, key);
        let Some(entries) = self.optional_mapping(map, path, key) else {
            return;
        };
        for (name, value) in entries {
            match name.as_str() {
                Some(name) if scalar_to_string(value).is_none() => self.violation(
                    &join(&field, name),
                    format!("expected a scalar value, got {}", type_name(value)),
                ),
                Some(_) => {}
                None => self.violation(&field, "mapping keys must be strings"),
            }
        }
    }

    pub fn string_list(&mut self, map: &Mapping, path: &str, key: &str) {
        let field = join(path, key);
        let Some(items) = self.optional_sequence(map, path, key) else {
            return;
        };
        for (index, item) in items.iter().enumerate() {
            self.expect_string(item, &format!("{}[{}]", field, index));
        }
    }

    pub fn expect_mapping<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Mapping> {
        match value {
            Value::Mapping(map) => Some(map),
            other => {
                self.violation(
                    path,
                    format!("expected a mapping, got {}", type_name(other)),
                );
                None
            }
        }
    }

    fn expect_string(&mut self, value: &Value, path: &str) {
        if !value.is_string() {
            self.violation(
                path,
                format!("expected a string, got {}", type_name(value)),
            );
        }
    }
}

pub(crate) fn join(path: &str, key: &str) -> String {
    if path.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", path, key)
    }
}

pub(crate) fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Deserialize a `{string: scalar}` mapping, storing every value as a string.
pub(crate) fn scalar_map<'de, D>(deserializer: D) -> Result<IndexMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<IndexMap<String, Value>> = Option::deserialize(deserializer)?;
    let mut out = IndexMap::new();
    for (key, value) in raw.unwrap_or_default() {
        let text = scalar_to_string(&value).ok_or_else(|| {
            D::Error::custom(format!("value for '{}' must be a scalar", key))
        })?;
        out.insert(key, text);
    }
    Ok(out)
}

/// Treat an explicit `null` the same as an absent collection.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
