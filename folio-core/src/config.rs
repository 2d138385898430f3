//! Run configuration.
//!
//! [`Config`] is the validated, immutable option set for one run.
//! [`ConfigFile`] is its on-disk YAML form:
//!
//! ```yaml
//! directory: ./content
//! source: ./export.json
//! format:
//!   "pages/**": markdown
//!   "*": yaml
//! content_types: [post, page]
//! concurrency: 8
//! watch:
//!   port: 1314
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use folio_convert::Format;
use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::plugin::Plugin;
use crate::types::{ContentTypeId, TransformContext};

pub const DEFAULT_CONCURRENCY: usize = 8;
pub const DEFAULT_FORMAT: Format = Format::Yaml;
pub const DEFAULT_WATCH_HOST: &str = "127.0.0.1";
pub const DEFAULT_WATCH_PORT: u16 = 1314;

/// Computes a format name per entry. The name is checked when the entry is
/// serialized, so an unknown name fails that entry only.
pub type FormatFn = Arc<dyn Fn(&TransformContext) -> String + Send + Sync>;

/// How the output format of an entry is chosen.
#[derive(Clone)]
pub enum FormatSpec {
    /// One format for every entry.
    Fixed(Format),
    /// Evaluated with the transform context of each entry.
    Computed(FormatFn),
    /// Ordered `(glob, format)` pairs matched against the output directory;
    /// first match wins.
    PatternTable(Vec<(glob::Pattern, Format)>),
}

impl FormatSpec {
    pub fn computed<F>(f: F) -> Self
    where
        F: Fn(&TransformContext) -> String + Send + Sync + 'static,
    {
        FormatSpec::Computed(Arc::new(f))
    }

    /// Compile a pattern table from `(glob, format name)` pairs.
    pub fn pattern_table<I, P, F>(pairs: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (P, F)>,
        P: AsRef<str>,
        F: AsRef<str>,
    {
        let mut table = Vec::new();
        for (pattern, format) in pairs {
            let pattern = pattern.as_ref();
            let compiled =
                glob::Pattern::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                    pattern: pattern.to_string(),
                    source,
                })?;
            table.push((compiled, Format::from_str(format.as_ref())?));
        }
        Ok(FormatSpec::PatternTable(table))
    }
}

impl fmt::Debug for FormatSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatSpec::Fixed(format) => f.debug_tuple("Fixed").field(format).finish(),
            FormatSpec::Computed(_) => f.write_str("Computed(<fn>)"),
            FormatSpec::PatternTable(table) => f
                .debug_list()
                .entries(table.iter().map(|(p, fmt)| (p.as_str(), fmt)))
                .finish(),
        }
    }
}

/// Run-wide options. Immutable for the duration of a run.
#[derive(Debug, Clone)]
pub struct Config {
    /// Output directory; every written path is relative to it.
    pub directory: PathBuf,
    /// `None` means every entry uses [`DEFAULT_FORMAT`].
    pub format: Option<FormatSpec>,
    /// Resolved plugins in registration order.
    pub plugins: Vec<Plugin>,
    /// Only export these content types. Empty exports all.
    pub content_types: Vec<ContentTypeId>,
    pub ignore_content_types: Vec<ContentTypeId>,
    /// Upper bound on entry pipelines in flight.
    pub concurrency: usize,
    /// Report what would change without touching the output directory.
    pub dry_run: bool,
}

impl Config {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            format: None,
            plugins: Vec::new(),
            content_types: Vec::new(),
            ignore_content_types: Vec::new(),
            concurrency: DEFAULT_CONCURRENCY,
            dry_run: false,
        }
    }

    pub fn with_format(mut self, format: FormatSpec) -> Self {
        self.format = Some(format);
        self
    }

    pub fn with_plugin(mut self, plugin: Plugin) -> Self {
        self.plugins.push(plugin);
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Check the invariants a run relies on before anything is written.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.directory.as_os_str().is_empty() {
            return Err(ConfigError::MissingDirectory);
        }
        if self.concurrency == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }
        if let Some(conflict) = self
            .content_types
            .iter()
            .find(|id| self.ignore_content_types.contains(id))
        {
            return Err(ConfigError::ConflictingContentType(conflict.0.clone()));
        }
        Ok(())
    }

    /// Whether entries of `content_type` take part in the run.
    pub fn includes_content_type(&self, content_type: &ContentTypeId) -> bool {
        if self.ignore_content_types.contains(content_type) {
            return false;
        }
        self.content_types.is_empty() || self.content_types.contains(content_type)
    }
}

// ---------------------------------------------------------------------------
// Config file
// ---------------------------------------------------------------------------

/// `format:` accepts a single name or an ordered glob → name mapping.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum FormatSetting {
    Name(String),
    Patterns(IndexMap<String, String>),
}

impl FormatSetting {
    pub fn into_spec(self) -> Result<FormatSpec, ConfigError> {
        match self {
            FormatSetting::Name(name) => Ok(FormatSpec::Fixed(Format::from_str(&name)?)),
            FormatSetting::Patterns(table) => FormatSpec::pattern_table(table),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WatchSettings {
    #[serde(default = "default_watch_host")]
    pub host: String,
    #[serde(default = "default_watch_port")]
    pub port: u16,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            host: default_watch_host(),
            port: default_watch_port(),
        }
    }
}

fn default_watch_host() -> String {
    DEFAULT_WATCH_HOST.to_string()
}

fn default_watch_port() -> u16 {
    DEFAULT_WATCH_PORT
}

/// On-disk configuration (`folio.yaml`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    #[serde(default)]
    pub directory: Option<PathBuf>,
    #[serde(default)]
    pub format: Option<FormatSetting>,
    /// Path to a content export used as the source.
    #[serde(default)]
    pub source: Option<PathBuf>,
    #[serde(default)]
    pub content_types: Vec<String>,
    #[serde(default)]
    pub ignore_content_types: Vec<String>,
    #[serde(default)]
    pub concurrency: Option<usize>,
    #[serde(default)]
    pub watch: WatchSettings,
}

impl ConfigFile {
    /// Load and parse a YAML config file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Build a validated [`Config`] with the given plugins.
    pub fn into_config(self, plugins: Vec<Plugin>) -> Result<Config, ConfigError> {
        let directory = self.directory.ok_or(ConfigError::MissingDirectory)?;
        let format = self.format.map(FormatSetting::into_spec).transpose()?;
        let config = Config {
            directory,
            format,
            plugins,
            content_types: self.content_types.into_iter().map(ContentTypeId).collect(),
            ignore_content_types: self
                .ignore_content_types
                .into_iter()
                .map(ContentTypeId)
                .collect(),
            concurrency: self.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            dry_run: false,
        };
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
