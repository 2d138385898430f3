//! Write task: transformed content → file on disk.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use folio_convert::Format;
use folio_core::config::DEFAULT_FORMAT;
use folio_core::{FormatSpec, TransformContext};

use crate::error::SyncError;
use crate::file_manager::WriteOutcome;
use crate::helpers;
use crate::runtime::RuntimeContext;

/// Resolve directory, format and filename for `ctx`, serialize its content
/// and hand it to the file manager.
pub async fn write_entry(
    runtime: &RuntimeContext,
    ctx: &TransformContext,
) -> Result<WriteOutcome, SyncError> {
    let directory = runtime
        .hooks
        .map_directory(ctx, ctx.content_type_id.0.clone())
        .await?;

    runtime
        .file_manager
        .claim_directory(Path::new(&directory), &ctx.content_type_id.0);

    let format = resolve_format(runtime.config.format.as_ref(), ctx, &directory)?;

    let filename = runtime
        .hooks
        .map_filename(ctx, helpers::default_filename(&ctx.id, &ctx.locale, format))
        .await?;

    let mut path = PathBuf::from(&directory);
    path.push(&filename);

    let text = match runtime.converter.stringify(&ctx.content, format) {
        Ok(text) => text,
        Err(err) => {
            runtime.file_manager.keep(&path);
            return Err(err.into());
        }
    };
    runtime.file_manager.write_file(&path, &text).await
}

/// Pick the output format for one entry.
///
/// The variant decides the rule: a fixed format, a computed name, or the
/// first pattern matching `directory`. With no spec, or no matching
/// pattern, the default format applies.
pub fn resolve_format(
    spec: Option<&FormatSpec>,
    ctx: &TransformContext,
    directory: &str,
) -> Result<Format, SyncError> {
    let format = match spec {
        Some(FormatSpec::Fixed(format)) => *format,
        Some(FormatSpec::Computed(compute)) => Format::from_str(&compute(ctx))?,
        Some(FormatSpec::PatternTable(table)) => table
            .iter()
            .find(|(pattern, _)| pattern.matches(directory))
            .map(|(_, format)| *format)
            .unwrap_or(DEFAULT_FORMAT),
        None => DEFAULT_FORMAT,
    };
    Ok(format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_convert::ConvertError;
    use folio_core::{Config, ContentTypeId, Entry, EntryId, Locale, Plugin};
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn context(locale: Locale) -> TransformContext {
        let entry: Entry = serde_json::from_value(json!({
            "sys": { "id": "e1", "contentType": { "sys": { "id": "post" } } },
            "fields": {}
        }))
        .unwrap();
        TransformContext {
            id: EntryId::from("e1"),
            locale,
            content_type_id: ContentTypeId::from("post"),
            entry,
            content: json!({ "title": "Hello", "content": "Body text" }),
        }
    }

    #[test]
    fn default_format_is_yaml() {
        let ctx = context(Locale::new("en", true));
        assert_eq!(resolve_format(None, &ctx, "post").unwrap(), Format::Yaml);
    }

    #[test]
    fn fixed_format_wins() {
        let ctx = context(Locale::new("en", true));
        let spec = FormatSpec::Fixed(Format::Toml);
        assert_eq!(resolve_format(Some(&spec), &ctx, "post").unwrap(), Format::Toml);
    }

    #[test]
    fn computed_format_sees_the_context() {
        let ctx = context(Locale::new("en", true));
        let spec = FormatSpec::computed(|ctx| {
            if ctx.content_type_id.0 == "post" {
                "md".to_string()
            } else {
                "json".to_string()
            }
        });
        assert_eq!(
            resolve_format(Some(&spec), &ctx, "post").unwrap(),
            Format::Markdown
        );
    }

    #[test]
    fn computed_unknown_name_is_an_error() {
        let ctx = context(Locale::new("en", true));
        let spec = FormatSpec::computed(|_| "docx".to_string());
        let err = resolve_format(Some(&spec), &ctx, "post").unwrap_err();
        assert!(matches!(
            err,
            SyncError::Convert(ConvertError::UnsupportedFormat(_))
        ));
    }

    #[test]
    fn pattern_table_first_match_wins() {
        let ctx = context(Locale::new("en", true));
        let spec = FormatSpec::pattern_table([
            ("pages/*", "markdown"),
            ("pages/**", "json"),
            ("*", "toml"),
        ])
        .unwrap();
        assert_eq!(
            resolve_format(Some(&spec), &ctx, "pages/about").unwrap(),
            Format::Markdown
        );
        assert_eq!(
            resolve_format(Some(&spec), &ctx, "post").unwrap(),
            Format::Toml
        );
    }

    #[test]
    fn pattern_table_without_match_falls_back_to_default() {
        let ctx = context(Locale::new("en", true));
        let spec = FormatSpec::pattern_table([("pages/*", "json")]).unwrap();
        assert_eq!(
            resolve_format(Some(&spec), &ctx, "post").unwrap(),
            Format::Yaml
        );
    }

    #[tokio::test]
    async fn writes_to_mapped_directory_with_locale_suffix() {
        let tmp = TempDir::new().unwrap();
        let plugin = Plugin::new("dirs")
            .map_directory_sync(|ctx, _| Some(format!("content/{}", ctx.content_type_id)));
        let config = Config::new(tmp.path())
            .with_format(FormatSpec::Fixed(Format::Markdown))
            .with_plugin(plugin);
        let runtime = RuntimeContext::setup(config).await.unwrap();

        let outcome = write_entry(&runtime, &context(Locale::new("de_DE", false)))
            .await
            .unwrap();

        assert_eq!(outcome.path(), PathBuf::from("content/post/e1@de-de.md"));
        let written = fs::read_to_string(tmp.path().join("content/post/e1@de-de.md")).unwrap();
        assert_eq!(written, "---\ntitle: Hello\n---\nBody text");
    }

    #[tokio::test]
    async fn map_filename_overrides_default_name() {
        let tmp = TempDir::new().unwrap();
        let plugin = Plugin::new("names").map_filename_sync(|ctx, current| {
            Some(current.replace(&ctx.id.0, "hello-world"))
        });
        let runtime = RuntimeContext::setup(Config::new(tmp.path()).with_plugin(plugin))
            .await
            .unwrap();

        let outcome = write_entry(&runtime, &context(Locale::new("en", true)))
            .await
            .unwrap();
        assert_eq!(outcome.path(), PathBuf::from("post/hello-world.yaml"));
        assert!(tmp.path().join("post/hello-world.yaml").exists());
    }
}
