//! [`Converter`]: dispatch `stringify` / `parse` by [`Format`].

use std::str::FromStr;

use serde_json::Value;

use crate::codecs;
use crate::error::ConvertError;
use crate::format::Format;

/// Stateless format registry. Cheap to copy into every task.
#[derive(Debug, Clone, Copy, Default)]
pub struct Converter;

impl Converter {
    pub fn new() -> Self {
        Self
    }

    pub fn stringify(&self, value: &Value, format: Format) -> Result<String, ConvertError> {
        match format {
            Format::Json => codecs::json::stringify(value),
            Format::Yaml => codecs::yaml::stringify(value),
            Format::Toml => codecs::toml::stringify(value),
            Format::Markdown => codecs::markdown::stringify_value(value),
        }
    }

    pub fn parse(&self, text: &str, format: Format) -> Result<Value, ConvertError> {
        match format {
            Format::Json => codecs::json::parse(text),
            Format::Yaml => codecs::yaml::parse(text),
            Format::Toml => codecs::toml::parse(text),
            Format::Markdown => codecs::markdown::parse_value(text),
        }
    }

    /// [`stringify`](Self::stringify) keyed by a format name.
    pub fn stringify_name(&self, value: &Value, format: &str) -> Result<String, ConvertError> {
        self.stringify(value, Format::from_str(format)?)
    }

    /// [`parse`](Self::parse) keyed by a format name.
    pub fn parse_name(&self, text: &str, format: &str) -> Result<Value, ConvertError> {
        self.parse(text, Format::from_str(format)?)
    }
}
