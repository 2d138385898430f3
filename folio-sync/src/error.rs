//! Error types for folio-sync.

use std::path::PathBuf;

use thiserror::Error;

use folio_convert::ConvertError;
use folio_core::{ConfigError, HookFailure};

/// A plugin hook implementation failed.
#[derive(Debug, Error)]
#[error("plugin '{plugin}' failed in {hook}: {source}")]
pub struct HookError {
    pub plugin: String,
    pub hook: &'static str,
    #[source]
    pub source: HookFailure,
}

impl HookError {
    pub fn new(plugin: impl Into<String>, hook: &'static str, source: HookFailure) -> Self {
        Self {
            plugin: plugin.into(),
            hook,
            source,
        }
    }
}

/// The content source could not be read.
#[derive(Debug, Error)]
pub enum FetchError {
    /// I/O failure reading a snapshot.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Snapshot or page payload is not valid JSON of the expected shape.
    #[error("invalid content payload: {0}")]
    Json(#[from] serde_json::Error),

    /// The source has no locales to export.
    #[error("content source returned no locales")]
    NoLocales,

    /// Any other failure reported by a source implementation.
    #[error("content source error: {0}")]
    Source(String),
}

/// All errors that can arise from a sync run.
///
/// Run-scoped variants ([`Config`](Self::Config), [`Fetch`](Self::Fetch),
/// [`Cancelled`](Self::Cancelled) and directory initialization I/O) abort a
/// run before reconciliation. The rest are scoped to a single entry: the
/// pipeline logs them, tallies a `failed` outcome and moves on.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("hook error: {0}")]
    Hook(#[from] HookError),

    #[error("serialization error: {0}")]
    Convert(#[from] ConvertError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A resolved output path is absolute or escapes the output directory.
    #[error("invalid output path {path}: {reason}")]
    Path { path: PathBuf, reason: &'static str },

    /// The entry carries no `sys.contentType` link.
    #[error("entry '{entry}' has no content type")]
    MissingContentType { entry: String },

    #[error("file manager already finalized")]
    AlreadyFinalized,

    #[error("run cancelled before all entries completed")]
    Cancelled,
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
