//! Run entrypoint shared by the CLI and the watch server.
//!
//! Setup → `before_run` → fetch → bounded fan-out over (entry, locale)
//! pairs → barrier → finalize → `after_run`.
//!
//! Entry-scoped failures are logged, counted `failed` and never stop the
//! run. The failed pair's existing files are kept through reconciliation. Setup, fetch and cancellation return early, before any orphan is
//! reconciled.

use std::future::Future;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use futures::future;
use futures::stream::{self, StreamExt};

use folio_core::{Config, Entry, Locale, Outcome, StatsKey, StatsSummary};

use crate::error::SyncError;
use crate::file_manager::WriteOutcome;
use crate::helpers;
use crate::mapper::EntryMapper;
use crate::runtime::RuntimeContext;
use crate::source::{fetch_all, ContentSource, DEFAULT_PAGE_SIZE};
use crate::transform::transform_entry;
use crate::write::write_entry;

/// Result of a completed run.
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    pub summary: StatsSummary,
    /// Orphans removed by reconciliation, relative to the output directory.
    pub deleted: Vec<PathBuf>,
    /// (entry, locale) pairs processed.
    pub processed: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl RunReport {
    pub fn failed(&self) -> u64 {
        self.summary.totals.failed
    }

    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Optional knobs for [`run_with`].
pub struct RunOptions {
    /// Replaces the default [`FieldMapper`](crate::mapper::FieldMapper).
    pub mapper: Option<Box<dyn EntryMapper>>,
    pub page_size: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mapper: None,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// Export every entry of `source` into `config.directory`.
pub async fn run(config: Config, source: &dyn ContentSource) -> Result<RunReport, SyncError> {
    run_with(config, source, RunOptions::default(), future::pending::<()>()).await
}

/// [`run`] with options and a shutdown signal.
///
/// When `shutdown` resolves before every entry has finished, the run stops
/// with [`SyncError::Cancelled`] and nothing is deleted.
pub async fn run_with<S>(
    config: Config,
    source: &dyn ContentSource,
    options: RunOptions,
    shutdown: S,
) -> Result<RunReport, SyncError>
where
    S: Future<Output = ()>,
{
    let started_at = Utc::now();
    let runtime = RuntimeContext::setup(config).await?;

    runtime.hooks.before_run(&runtime.config).await?;

    let fetched = fetch_all(source, options.page_size).await?;
    let runtime = runtime.with_content(fetched.locales, fetched.content_types, options.mapper);

    let entries: Vec<&Entry> = fetched
        .entries
        .iter()
        .filter(|entry| {
            entry
                .content_type_id()
                .map_or(true, |id| runtime.config.includes_content_type(&id))
        })
        .collect();

    let jobs: Vec<(&Entry, &Locale)> = entries
        .iter()
        .flat_map(|entry| runtime.locales.iter().map(move |locale| (*entry, locale)))
        .collect();
    let processed = jobs.len();

    tracing::info!(
        directory = %runtime.config.directory.display(),
        entries = entries.len(),
        locales = runtime.locales.len(),
        concurrency = runtime.config.concurrency,
        dry_run = runtime.config.dry_run,
        "sync started"
    );

    let work = stream::iter(
        jobs.into_iter()
            .map(|(entry, locale)| process_entry(&runtime, entry, locale))
            .collect::<Vec<_>>(),
    )
        .buffer_unordered(runtime.config.concurrency)
        .collect::<Vec<()>>();

    tokio::select! {
        _ = work => {}
        _ = shutdown => {
            tracing::warn!("sync cancelled; skipping reconciliation");
            return Err(SyncError::Cancelled);
        }
    }

    let finalized = runtime.file_manager.finalize(&runtime.stats).await?;
    let summary = runtime.stats.summary();

    if let Err(err) = runtime.hooks.after_run(&summary).await {
        tracing::warn!(error = %err, "after_run hook failed");
    }

    let finished_at = Utc::now();
    tracing::info!(
        created = summary.totals.created,
        updated = summary.totals.updated,
        deleted = summary.totals.deleted,
        skipped = summary.totals.skipped,
        failed = summary.totals.failed,
        elapsed_ms = (finished_at - started_at).num_milliseconds(),
        "sync finished"
    );

    Ok(RunReport {
        summary,
        deleted: finalized.deleted,
        processed,
        dry_run: runtime.config.dry_run,
        started_at,
        finished_at,
    })
}

async fn export_entry(
    runtime: &RuntimeContext,
    entry: &Entry,
    locale: &Locale,
) -> Result<WriteOutcome, SyncError> {
    let ctx = transform_entry(runtime, entry, locale).await?;
    write_entry(runtime, &ctx).await
}

/// Transform and write one (entry, locale) pair, recording its outcome.
async fn process_entry(runtime: &RuntimeContext, entry: &Entry, locale: &Locale) {
    let content_type = entry
        .content_type_id()
        .map(|id| id.0)
        .unwrap_or_default();
    let key = StatsKey::new(content_type.clone(), locale.code.normalized());

    match export_entry(runtime, entry, locale).await {
        Ok(outcome) => {
            tracing::debug!(
                entry = %entry.id(),
                locale = %locale.code,
                path = %outcome.path().display(),
                outcome = %outcome.outcome(),
                "entry written"
            );
            runtime.stats.record(key, outcome.outcome());
        }
        Err(err) => {
            tracing::warn!(
                entry = %entry.id(),
                locale = %locale.code,
                content_type = %content_type,
                error = %err,
                "entry failed"
            );
            runtime.file_manager.protect_stem(format!(
                "{}{}",
                entry.id().0,
                helpers::locale_suffix(locale)
            ));
            runtime.stats.record(key, Outcome::Failed);
        }
    }
}
