//! Folio: export CMS content into a static-site content directory.
//!
//! # Usage
//!
//! ```text
//! folio sync  [--config F] [--directory D] [--source S] [--format F] [--dry-run] [--json]
//! folio watch [--config F] [--directory D] [--source S] [--port P] [--no-initial-sync]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{sync::SyncArgs, watch::WatchArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "folio",
    version,
    about = "Export CMS entries as JSON, YAML, TOML or Markdown files",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Export every entry once and report what changed.
    Sync(SyncArgs),

    /// Run an initial sync, then resync whenever a webhook arrives.
    Watch(WatchArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    folio_watch::init_tracing();
    match cli.command {
        Commands::Sync(args) => args.run(),
        Commands::Watch(args) => args.run(),
    }
}
