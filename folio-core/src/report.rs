//! Run outcome vocabulary shared by the stats counter, lifecycle hooks and
//! the CLI report.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

/// What happened to one output file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Created,
    Updated,
    Deleted,
    Skipped,
    Failed,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Created => write!(f, "created"),
            Outcome::Updated => write!(f, "updated"),
            Outcome::Deleted => write!(f, "deleted"),
            Outcome::Skipped => write!(f, "skipped"),
            Outcome::Failed => write!(f, "failed"),
        }
    }
}

/// Stats are tallied per (content type, locale).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct StatsKey {
    pub content_type: String,
    pub locale: String,
}

impl StatsKey {
    pub fn new(content_type: impl Into<String>, locale: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            locale: locale.into(),
        }
    }
}

/// Counts per outcome kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct OutcomeCounts {
    pub created: u64,
    pub updated: u64,
    pub deleted: u64,
    pub skipped: u64,
    pub failed: u64,
}

impl OutcomeCounts {
    pub fn get(&self, outcome: Outcome) -> u64 {
        match outcome {
            Outcome::Created => self.created,
            Outcome::Updated => self.updated,
            Outcome::Deleted => self.deleted,
            Outcome::Skipped => self.skipped,
            Outcome::Failed => self.failed,
        }
    }

    pub fn increment(&mut self, outcome: Outcome) {
        let slot = match outcome {
            Outcome::Created => &mut self.created,
            Outcome::Updated => &mut self.updated,
            Outcome::Deleted => &mut self.deleted,
            Outcome::Skipped => &mut self.skipped,
            Outcome::Failed => &mut self.failed,
        };
        *slot += 1;
    }

    /// Add every count of `other` into `self`.
    pub fn merge(&mut self, other: &OutcomeCounts) {
        self.created += other.created;
        self.updated += other.updated;
        self.deleted += other.deleted;
        self.skipped += other.skipped;
        self.failed += other.failed;
    }

    pub fn total(&self) -> u64 {
        self.created + self.updated + self.deleted + self.skipped + self.failed
    }

    /// `true` when the run changed nothing on disk.
    pub fn is_noop(&self) -> bool {
        self.created == 0 && self.updated == 0 && self.deleted == 0
    }
}

/// Read-only snapshot of a run's stats.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub by_key: BTreeMap<StatsKey, OutcomeCounts>,
    pub totals: OutcomeCounts,
}

impl StatsSummary {
    pub fn grand_total(&self) -> u64 {
        self.totals.total()
    }
}
