//! Schema-less catalog records.
//!
//! NetrunnerDB entities (cards, packs, cycles, factions, sides, types) are kept
//! as plain JSON objects. Fields are reached by dotted path (`pack.code`,
//! `cycle.name`) and tested for truthiness the way templates expect: only a
//! missing value, `null` and `false` are falsy.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One catalog entity as returned by the API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CatalogRecord(Value);

impl CatalogRecord {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    /// Wrap every element of a JSON array. Anything else becomes a single record.
    pub fn wrap_all(value: Value) -> Vec<Self> {
        match value {
            Value::Array(items) => items.into_iter().map(Self).collect(),
            Value::Null => Vec::new(),
            other => vec![Self(other)],
        }
    }

    /// Look up a dotted path such as `"pack.code"`.
    pub fn lookup(&self, path: &str) -> Option<&Value> {
        lookup(&self.0, path)
    }

    pub fn str(&self, path: &str) -> Option<&str> {
        self.lookup(path).and_then(Value::as_str)
    }

    pub fn u32(&self, path: &str) -> Option<u32> {
        self.lookup(path)
            .and_then(Value::as_u64)
            .and_then(|n| u32::try_from(n).ok())
    }

    pub fn is_truthy(&self, path: &str) -> bool {
        is_truthy(self.lookup(path))
    }

    /// The record's `code` field, the identifier NetrunnerDB uses everywhere.
    pub fn code(&self) -> Option<&str> {
        self.str("code")
    }

    pub fn as_object(&self) -> Option<&Map<String, Value>> {
        self.0.as_object()
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    pub fn into_value(self) -> Value {
        self.0
    }
}

impl From<Value> for CatalogRecord {
    fn from(value: Value) -> Self {
        Self(value)
    }
}

impl From<CatalogRecord> for Value {
    fn from(record: CatalogRecord) -> Self {
        record.0
    }
}

/// Follow a dotted path through nested objects. Numeric segments index arrays.
pub fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |current, key| match current {
        Value::Object(map) => map.get(key),
        Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

pub fn is_truthy(value: Option<&Value>) -> bool {
    !matches!(value, None | Some(Value::Null) | Some(Value::Bool(false)))
}

/// Render a value for use in file names and PNG text chunks.
///
/// Strings are written without quotes and `null` becomes an empty string;
/// everything else uses its JSON form.
pub fn to_plain_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "tests/record_tests.rs"]
mod tests;
