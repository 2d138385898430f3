//! JSON codec.
//!
//! Output is canonical: object keys sorted at every depth, two-space
//! indentation, trailing newline. Unchanged input always produces
//! byte-identical text, which the file manager's no-op check relies on.

use serde_json::{Map, Value};

use crate::error::ConvertError;

pub fn stringify(value: &Value) -> Result<String, ConvertError> {
    let mut out = serde_json::to_string_pretty(&canonicalize(value))?;
    out.push('\n');
    Ok(out)
}

pub fn parse(text: &str) -> Result<Value, ConvertError> {
    Ok(serde_json::from_str(text)?)
}

/// Rebuild `value` with object keys inserted in sorted order.
///
/// Independent of whether serde_json's `preserve_order` feature is enabled
/// somewhere in the dependency graph.
pub fn canonicalize(value: &Value) -> Value {
    match value {
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().collect();
            keys.sort();
            let mut sorted = Map::new();
            for key in keys {
                sorted.insert(key.clone(), canonicalize(&map[key]));
            }
            Value::Object(sorted)
        }
        other => other.clone(),
    }
}
