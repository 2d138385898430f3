//! # folio-convert
//!
//! Format-specific encode/decode for exported content: JSON, YAML, TOML and
//! front-matter Markdown.
//!
//! ```rust
//! use folio_convert::{Converter, Format};
//! use serde_json::json;
//!
//! let converter = Converter::new();
//! let value = json!({ "title": "Hello", "tags": ["a", "b"] });
//! let text = converter.stringify(&value, Format::Yaml).unwrap();
//! assert_eq!(converter.parse(&text, Format::Yaml).unwrap(), value);
//! ```

pub mod codecs;
pub mod error;
pub mod format;
pub mod registry;

pub use codecs::markdown::MarkdownDocument;
pub use error::ConvertError;
pub use format::Format;
pub use registry::Converter;
