//! Markdown with a YAML front-matter block.
//!
//! ```text
//! ---
//! title: Hello
//! ---
//! Body text.
//! ```

use serde_json::{Map, Value};

use crate::codecs::yaml;
use crate::error::ConvertError;

const FENCE: &str = "---";

/// Key whose string value becomes the Markdown body when going through the
/// registry.
pub const BODY_KEY: &str = "content";

/// Decoded front matter plus body.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkdownDocument {
    pub data: Value,
    pub content: String,
}

/// `---\n<yaml>---\n<body>`. The YAML text always ends in a newline.
pub fn stringify(data: &Value, body: &str) -> Result<String, ConvertError> {
    let front_matter = match data {
        Value::Object(map) if map.is_empty() => String::new(),
        other => yaml::stringify(other)?,
    };
    Ok(format!("{FENCE}\n{front_matter}{FENCE}\n{body}"))
}

/// Split front matter from body. Text without an opening fence is all body.
pub fn parse(text: &str) -> Result<MarkdownDocument, ConvertError> {
    let Some(rest) = strip_fence_line(text) else {
        return Ok(MarkdownDocument {
            data: Value::Object(Map::new()),
            content: text.to_string(),
        });
    };

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']) == FENCE {
            let front_matter = &rest[..offset];
            let content = &rest[offset + line.len()..];
            return Ok(MarkdownDocument {
                data: yaml::parse(front_matter)?,
                content: content.to_string(),
            });
        }
        offset += line.len();
    }
    Err(ConvertError::UnterminatedFrontMatter)
}

fn strip_fence_line(text: &str) -> Option<&str> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    text.strip_prefix("---\r\n")
        .or_else(|| text.strip_prefix("---\n"))
}

/// Registry form: a top-level non-empty string [`BODY_KEY`] becomes the
/// body. Anything else, including an empty string, stays in the front
/// matter.
pub fn stringify_value(value: &Value) -> Result<String, ConvertError> {
    match value {
        Value::Object(map) => match map.get(BODY_KEY) {
            Some(Value::String(body)) if !body.is_empty() => {
                let mut data = map.clone();
                data.remove(BODY_KEY);
                stringify(&Value::Object(data), body)
            }
            _ => stringify(value, ""),
        },
        other => stringify(other, ""),
    }
}

/// Registry form: a non-empty body is stored under [`BODY_KEY`].
pub fn parse_value(text: &str) -> Result<Value, ConvertError> {
    let MarkdownDocument { data, content } = parse(text)?;
    if content.is_empty() {
        return Ok(data);
    }
    match data {
        Value::Object(mut map) => {
            map.insert(BODY_KEY.to_string(), Value::String(content));
            Ok(Value::Object(map))
        }
        other => Err(ConvertError::UnsupportedValue {
            format: "markdown",
            reason: format!("front matter must be a mapping when a body is present, got {other}"),
        }),
    }
}
