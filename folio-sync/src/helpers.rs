//! Pure helpers shared by the tasks and available to plugins.

use folio_convert::Format;
use folio_core::{EntryId, Locale};

/// `""` for the default locale, `@{code}` otherwise (lower-cased, `_` → `-`).
pub fn locale_suffix(locale: &Locale) -> String {
    if locale.default {
        String::new()
    } else {
        format!("@{}", locale.code.normalized())
    }
}

/// `{id}{locale-suffix}.{extension}`
pub fn default_filename(id: &EntryId, locale: &Locale, format: Format) -> String {
    format!("{}{}.{}", id.0, locale_suffix(locale), format.extension())
}

/// The locale part of a file stem written with [`locale_suffix`].
pub fn locale_from_stem(stem: &str) -> Option<&str> {
    stem.rsplit_once('@')
        .map(|(_, locale)| locale)
        .filter(|locale| !locale.is_empty())
}
