//! Error types for folio-core.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a run [`Config`](crate::Config).
///
/// Every variant is fatal: a run never starts writing with an invalid
/// configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file could not be read.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error on load; includes file path and line context from serde_yaml.
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// No output directory was configured.
    #[error("no output directory configured")]
    MissingDirectory,

    /// A format name in the config is not one of the supported formats.
    #[error("invalid format in config: {0}")]
    Format(#[from] folio_convert::ConvertError),

    /// A glob pattern in the format table does not compile.
    #[error("invalid format pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    /// `concurrency` must allow at least one entry in flight.
    #[error("concurrency must be at least 1")]
    InvalidConcurrency,

    /// A content type is both included and ignored.
    #[error("content type '{0}' is both included and ignored")]
    ConflictingContentType(String),
}
