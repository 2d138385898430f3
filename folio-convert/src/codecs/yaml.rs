//! YAML codec backed by serde_yaml.

use serde_json::Value;

use crate::error::ConvertError;

pub fn stringify(value: &Value) -> Result<String, ConvertError> {
    Ok(serde_yaml::to_string(value)?)
}

pub fn parse(text: &str) -> Result<Value, ConvertError> {
    // An empty document is an empty mapping, not `null`.
    if text.trim().is_empty() {
        return Ok(Value::Object(Default::default()));
    }
    Ok(serde_yaml::from_str(text)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ambiguous_strings_stay_strings() {
        let value = json!({ "flag": "true", "version": "1.0", "empty": "" });
        let text = stringify(&value).unwrap();
        assert_eq!(parse(&text).unwrap(), value);
    }

    #[test]
    fn empty_document_is_empty_object() {
        assert_eq!(parse("").unwrap(), json!({}));
    }
}
