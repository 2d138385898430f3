//! The closed set of output formats.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConvertError;

/// A serialization format key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    Json,
    Yaml,
    Toml,
    Markdown,
}

impl Format {
    pub fn all() -> &'static [Format] {
        &[Format::Json, Format::Yaml, Format::Toml, Format::Markdown]
    }

    /// Canonical format name.
    pub fn name(&self) -> &'static str {
        match self {
            Format::Json => "json",
            Format::Yaml => "yaml",
            Format::Toml => "toml",
            Format::Markdown => "markdown",
        }
    }

    /// File extension written for this format (no leading dot).
    pub fn extension(&self) -> &'static str {
        match self {
            Format::Markdown => "md",
            other => other.name(),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Format {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Format::Json),
            "yaml" | "yml" => Ok(Format::Yaml),
            "toml" => Ok(Format::Toml),
            "markdown" | "md" => Ok(Format::Markdown),
            _ => Err(ConvertError::UnsupportedFormat(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_names_and_aliases() {
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!("YML".parse::<Format>().unwrap(), Format::Yaml);
        assert_eq!("md".parse::<Format>().unwrap(), Format::Markdown);
        assert_eq!(" toml ".parse::<Format>().unwrap(), Format::Toml);
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let err = "xml".parse::<Format>().unwrap_err();
        assert!(matches!(err, ConvertError::UnsupportedFormat(name) if name == "xml"));
    }

    #[test]
    fn markdown_uses_md_extension() {
        assert_eq!(Format::Markdown.extension(), "md");
        assert_eq!(Format::Yaml.extension(), "yaml");
    }

    #[test]
    fn display_roundtrips_through_from_str() {
        for format in Format::all() {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), *format);
        }
    }
}
