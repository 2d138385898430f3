//! # folio-sync
//!
//! Content export runs: fetch from a [`ContentSource`], map and transform
//! every (entry, locale) pair through the plugin hooks, and write the result
//! with hash-gated atomic writes. Files the run no longer produces are
//! reconciled away at the end.
//!
//! Call [`run`] for a plain run, or [`run_with`] to supply a custom
//! [`EntryMapper`] or a shutdown signal.

pub mod error;
pub mod file_manager;
pub mod helpers;
pub mod hooks;
pub mod mapper;
pub mod pipeline;
pub mod runtime;
pub mod source;
pub mod stats;
pub mod transform;
pub mod write;

pub use error::{FetchError, HookError, SyncError};
pub use file_manager::{FileManager, FinalizeReport, WriteOutcome};
pub use hooks::HookManager;
pub use mapper::{EntryMapper, FieldMapper};
pub use pipeline::{run, run_with, RunOptions, RunReport};
pub use runtime::RuntimeContext;
pub use source::{fetch_all, ContentSource, Page, PageRequest, Snapshot, SnapshotSource};
pub use stats::Stats;
pub use transform::transform_entry;
pub use write::{resolve_format, write_entry};
