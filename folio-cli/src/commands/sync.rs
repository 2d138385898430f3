//! `folio sync`: export every entry once and report what changed.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;
use tabled::{settings::Style, Table, Tabled};

use folio_sync::RunReport;

use super::{build_runtime, export, ExportArgs};

/// Arguments for `folio sync`.
#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(flatten)]
    pub export: ExportArgs,

    /// Report what would change without writing or deleting any file.
    #[arg(long)]
    pub dry_run: bool,

    /// Emit the summary as JSON.
    #[arg(long)]
    pub json: bool,
}

impl SyncArgs {
    pub fn run(self) -> Result<()> {
        let resolved = self.export.resolve()?;
        let config = resolved.config.with_dry_run(self.dry_run);

        let runtime = build_runtime()?;
        let report = runtime
            .block_on(export(config, resolved.source))
            .context("sync failed")?;

        if self.json {
            print_json(&report)
        } else {
            print_report(&report);
            Ok(())
        }
    }
}

#[derive(Tabled)]
struct SummaryRow {
    #[tabled(rename = "content type")]
    content_type: String,
    #[tabled(rename = "locale")]
    locale: String,
    #[tabled(rename = "created")]
    created: u64,
    #[tabled(rename = "updated")]
    updated: u64,
    #[tabled(rename = "deleted")]
    deleted: u64,
    #[tabled(rename = "skipped")]
    skipped: u64,
    #[tabled(rename = "failed")]
    failed: u64,
}

fn print_report(report: &RunReport) {
    let prefix = if report.dry_run { "[dry-run] " } else { "" };
    let totals = &report.summary.totals;

    let headline = format!(
        "{prefix}{} created, {} updated, {} deleted, {} skipped, {} failed",
        totals.created, totals.updated, totals.deleted, totals.skipped, totals.failed
    );
    if totals.failed > 0 {
        println!("{} {}", "!".yellow().bold(), headline);
    } else if totals.is_noop() {
        println!("{} {} (nothing to do)", "✓".green().bold(), headline);
    } else {
        println!("{} {}", "✓".green().bold(), headline);
    }

    if !report.summary.by_key.is_empty() {
        let rows: Vec<SummaryRow> = report
            .summary
            .by_key
            .iter()
            .map(|(key, counts)| SummaryRow {
                content_type: if key.content_type.is_empty() {
                    "-".to_string()
                } else {
                    key.content_type.clone()
                },
                locale: key.locale.clone(),
                created: counts.created,
                updated: counts.updated,
                deleted: counts.deleted,
                skipped: counts.skipped,
                failed: counts.failed,
            })
            .collect();
        let mut table = Table::new(rows);
        table.with(Style::rounded());
        println!("{table}");
    }

    for path in &report.deleted {
        println!("  {}  {}", "✗".red(), path.display());
    }

    println!(
        "{} entries × locales in {} ms, finished {}",
        report.processed,
        report.elapsed().num_milliseconds(),
        report
            .finished_at
            .with_timezone(&chrono::Local)
            .format("%H:%M:%S")
    );
}

fn print_json(report: &RunReport) -> Result<()> {
    let rows: Vec<_> = report
        .summary
        .by_key
        .iter()
        .map(|(key, counts)| {
            json!({
                "content_type": key.content_type,
                "locale": key.locale,
                "counts": counts,
            })
        })
        .collect();
    let payload = json!({
        "dry_run": report.dry_run,
        "processed": report.processed,
        "totals": report.summary.totals,
        "by_key": rows,
        "deleted": report.deleted,
        "started_at": report.started_at.to_rfc3339(),
        "finished_at": report.finished_at.to_rfc3339(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize sync summary")?
    );
    Ok(())
}
