//! `folio watch`: initial sync, then resync on every webhook.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Args;
use futures::FutureExt;

use folio_watch::{ResyncFn, WatchOptions};

use super::{build_runtime, export, ExportArgs};

/// Arguments for `folio watch`.
#[derive(Args, Debug)]
pub struct WatchArgs {
    #[command(flatten)]
    pub export: ExportArgs,

    /// Port to listen on; overrides `watch.port` from the config file.
    #[arg(long, env = "FOLIO_PORT")]
    pub port: Option<u16>,

    /// Skip the sync that normally runs at startup.
    #[arg(long)]
    pub no_initial_sync: bool,
}

impl WatchArgs {
    pub fn run(self) -> Result<()> {
        let resolved = self.export.resolve()?;

        let mut settings = resolved.watch;
        if let Some(port) = self.port {
            settings.port = port;
        }
        let mut options =
            WatchOptions::from_settings(&settings).context("invalid watch settings")?;
        options.initial_sync = !self.no_initial_sync;

        let config = resolved.config;
        let source = resolved.source;
        let resync: ResyncFn = Arc::new(move || export(config.clone(), source.clone()).boxed());

        let runtime = build_runtime()?;
        runtime
            .block_on(folio_watch::run(options, resync))
            .context("watch server exited with error")
    }
}
