//! Transform task: raw entry + locale → transformed content. Never touches
//! the filesystem.

use serde_json::Value;

use folio_core::{Entry, Locale, TransformContext};

use crate::error::SyncError;
use crate::runtime::RuntimeContext;

/// Map `entry` for `locale`, attach its `sys` block and run the `transform`
/// hook chain.
pub async fn transform_entry(
    runtime: &RuntimeContext,
    entry: &Entry,
    locale: &Locale,
) -> Result<TransformContext, SyncError> {
    let content_type_id = entry
        .content_type_id()
        .ok_or_else(|| SyncError::MissingContentType {
            entry: entry.id().0.clone(),
        })?;

    let mut content = runtime
        .mapper
        .map(entry, locale, runtime.schema(&content_type_id));
    if let Value::Object(fields) = &mut content {
        fields.insert("sys".into(), entry.sys_metadata(&content_type_id));
    }

    let mut ctx = TransformContext {
        id: entry.id().clone(),
        locale: locale.clone(),
        content_type_id,
        entry: entry.clone(),
        content: content.clone(),
    };
    ctx.content = runtime.hooks.transform(&ctx, content).await?;
    Ok(ctx)
}
