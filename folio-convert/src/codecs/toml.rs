//! TOML codec.
//!
//! TOML has no null and requires a table at the top level. Nulls are
//! dropped before encoding, including inside arrays; any other top-level
//! value is rejected.

use serde_json::{Map, Value};

use crate::error::ConvertError;

pub fn stringify(value: &Value) -> Result<String, ConvertError> {
    let Value::Object(map) = value else {
        return Err(ConvertError::UnsupportedValue {
            format: "toml",
            reason: "top-level value must be a table".to_string(),
        });
    };
    let stripped = Value::Object(strip_nulls(map));
    Ok(toml::to_string(&stripped)?)
}

pub fn parse(text: &str) -> Result<Value, ConvertError> {
    let table: toml::Table = toml::from_str(text)?;
    Ok(serde_json::to_value(table)?)
}

fn strip_nulls(map: &Map<String, Value>) -> Map<String, Value> {
    map.iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| (k.clone(), strip_value(v)))
        .collect()
}

fn strip_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(strip_nulls(map)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .filter(|v| !v.is_null())
                .map(strip_value)
                .collect(),
        ),
        other => other.clone(),
    }
}
