//! Outcome counters per (content type, locale).

use std::collections::BTreeMap;
use std::path::{Component, Path};
use std::sync::{Mutex, PoisonError};

use folio_core::{Outcome, OutcomeCounts, StatsKey, StatsSummary};

use crate::helpers;

/// Locale label for an unsuffixed orphan when the default locale is unknown.
pub const DEFAULT_LOCALE_LABEL: &str = "*";

/// Thread-safe tally of run outcomes. Counts only ever increase.
#[derive(Debug, Default)]
pub struct Stats {
    counts: Mutex<BTreeMap<StatsKey, OutcomeCounts>>,
}

impl Stats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, key: StatsKey, outcome: Outcome) {
        let mut counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.entry(key).or_default().increment(outcome);
    }

    /// Total count of one outcome across all keys.
    pub fn count(&self, outcome: Outcome) -> u64 {
        let counts = self.counts.lock().unwrap_or_else(PoisonError::into_inner);
        counts.values().map(|c| c.get(outcome)).sum()
    }

    pub fn summary(&self) -> StatsSummary {
        let by_key = self
            .counts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let mut totals = OutcomeCounts::default();
        for counts in by_key.values() {
            totals.merge(counts);
        }
        StatsSummary { by_key, totals }
    }
}

/// Stats key for a deleted orphan, derived from its path relative to the
/// output directory.
///
/// The content type is `owner` when this run wrote into the orphan's
/// directory, else the first path component. The locale is the `@locale`
/// file-stem suffix, else `default_locale`, else [`DEFAULT_LOCALE_LABEL`].
pub fn orphan_key(
    relative: &Path,
    owner: Option<&str>,
    default_locale: Option<&str>,
) -> StatsKey {
    let content_type = match owner {
        Some(owner) => owner.to_string(),
        None => match relative.components().next() {
            Some(Component::Normal(first)) if relative.components().count() > 1 => {
                first.to_string_lossy().into_owned()
            }
            _ => String::new(),
        },
    };
    let locale = relative
        .file_stem()
        .and_then(|stem| stem.to_str())
        .and_then(helpers::locale_from_stem)
        .or(default_locale)
        .unwrap_or(DEFAULT_LOCALE_LABEL)
        .to_string();
    StatsKey::new(content_type, locale)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn record_accumulates_per_key() {
        let stats = Stats::new();
        let post_en = StatsKey::new("post", "en-US");
        stats.record(post_en.clone(), Outcome::Created);
        stats.record(post_en.clone(), Outcome::Created);
        stats.record(StatsKey::new("post", "de-DE"), Outcome::Skipped);

        let summary = stats.summary();
        assert_eq!(summary.by_key[&post_en].created, 2);
        assert_eq!(summary.totals.created, 2);
        assert_eq!(summary.totals.skipped, 1);
        assert_eq!(summary.grand_total(), 3);
    }

    #[test]
    fn concurrent_increments_are_not_lost() {
        let stats = Arc::new(Stats::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let stats = stats.clone();
                std::thread::spawn(move || {
                    for _ in 0..250 {
                        stats.record(StatsKey::new("post", "en-US"), Outcome::Updated);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(stats.count(Outcome::Updated), 2000);
    }

    #[test]
    fn orphan_key_reads_directory_and_locale_suffix() {
        assert_eq!(
            orphan_key(Path::new("post/abc@de-de.yaml"), None, Some("en-us")),
            StatsKey::new("post", "de-de")
        );
        assert_eq!(
            orphan_key(Path::new("post/abc.yaml"), None, None),
            StatsKey::new("post", DEFAULT_LOCALE_LABEL)
        );
        assert_eq!(
            orphan_key(Path::new("loose.json"), None, None),
            StatsKey::new("", DEFAULT_LOCALE_LABEL)
        );
    }

    #[test]
    fn orphan_key_prefers_directory_owner_and_default_locale() {
        assert_eq!(
            orphan_key(Path::new("content/post/abc.yaml"), Some("post"), Some("en-us")),
            StatsKey::new("post", "en-us")
        );
        assert_eq!(
            orphan_key(Path::new("content/post/abc.yaml"), None, Some("en-us")),
            StatsKey::new("content", "en-us")
        );
    }
}
