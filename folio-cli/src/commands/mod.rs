pub mod sync;
pub mod watch;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use folio_core::{Config, ConfigFile, FormatSetting, WatchSettings};
use folio_sync::{RunReport, SnapshotSource, SyncError};

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "folio.yaml";

/// Flags shared by every command that runs an export.
#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Config file (defaults to ./folio.yaml when present).
    #[arg(long, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output directory; overrides `directory:` from the config file.
    #[arg(long, env = "FOLIO_DIRECTORY")]
    pub directory: Option<PathBuf>,

    /// Content export (JSON snapshot) to read entries from.
    #[arg(long, env = "FOLIO_SOURCE")]
    pub source: Option<PathBuf>,

    /// Output format for every entry: json, yaml, toml or markdown.
    #[arg(long)]
    pub format: Option<String>,
}

/// A config file merged with command-line overrides.
pub struct Resolved {
    pub config: Config,
    pub source: PathBuf,
    pub watch: WatchSettings,
}

impl ExportArgs {
    pub fn resolve(&self) -> Result<Resolved> {
        let mut file = load_config_file(self.config.as_deref())?;

        if let Some(directory) = &self.directory {
            file.directory = Some(directory.clone());
        }
        if let Some(source) = &self.source {
            file.source = Some(source.clone());
        }
        if let Some(format) = &self.format {
            file.format = Some(FormatSetting::Name(format.clone()));
        }

        let source = file
            .source
            .clone()
            .context("no content source configured; pass --source or set `source:` in folio.yaml")?;
        let watch = file.watch.clone();
        let config = file
            .into_config(Vec::new())
            .context("invalid configuration")?;

        Ok(Resolved {
            config,
            source,
            watch,
        })
    }
}

fn load_config_file(explicit: Option<&Path>) -> Result<ConfigFile> {
    match explicit {
        Some(path) => ConfigFile::load(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => {
            let implicit = Path::new(DEFAULT_CONFIG_FILE);
            if implicit.is_file() {
                tracing::debug!("using {}", implicit.display());
                ConfigFile::load(implicit).context("failed to load ./folio.yaml")
            } else {
                Ok(ConfigFile::default())
            }
        }
    }
}

/// One export run from a snapshot file.
pub async fn export(config: Config, source: PathBuf) -> Result<RunReport, SyncError> {
    let source = SnapshotSource::from_path(&source).await?;
    folio_sync::run(config, &source).await
}

pub fn build_runtime() -> Result<tokio::runtime::Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")
}
