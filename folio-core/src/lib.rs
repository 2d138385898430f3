//! Folio core library: domain types, run configuration, plugin handles.
//!
//! - [`types`]: newtypes, raw source records and [`TransformContext`]
//! - [`config`]: [`Config`], [`FormatSpec`] and the YAML [`ConfigFile`]
//! - [`plugin`]: [`Plugin`] hook handles
//! - [`report`]: outcome vocabulary for stats and reports
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod plugin;
pub mod report;
pub mod types;

pub use config::{Config, ConfigFile, FormatSetting, FormatSpec, WatchSettings};
pub use error::ConfigError;
pub use folio_convert::Format;
pub use plugin::{HookFailure, HookResult, Plugin};
pub use report::{Outcome, OutcomeCounts, StatsKey, StatsSummary};
pub use types::{
    ContentType, ContentTypeId, Entry, EntryId, EntrySys, FieldDef, Locale, LocaleCode,
    TransformContext,
};
