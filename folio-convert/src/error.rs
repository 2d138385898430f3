//! Error types for folio-convert.

use thiserror::Error;

/// All errors that can arise from encoding or decoding content.
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The format key is not one of `json`, `yaml`, `toml`, `markdown`.
    #[error("unsupported format '{0}'; expected: json, yaml, toml, markdown")]
    UnsupportedFormat(String),

    /// The value has a shape the target format cannot express.
    #[error("{format} cannot represent this value: {reason}")]
    UnsupportedValue {
        format: &'static str,
        reason: String,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// A front-matter block was opened with `---` but never closed.
    #[error("unterminated front matter block")]
    UnterminatedFrontMatter,
}
