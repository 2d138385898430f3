//! One module per format. Each exposes `stringify(&Value)` and `parse(&str)`.

pub mod json;
pub mod markdown;
pub mod toml;
pub mod yaml;
