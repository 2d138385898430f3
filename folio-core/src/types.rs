//! Domain types for content flowing through a folio run.
//!
//! Raw records ([`Entry`], [`Locale`], [`ContentType`]) mirror the JSON shape
//! of a CMS export so they deserialize straight from a delivery API page or
//! a snapshot file. [`TransformContext`] is the per-(entry, locale) working
//! state threaded through the hook chain.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed entry identifier (`sys.id`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(pub String);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed content type identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ContentTypeId(pub String);

impl fmt::Display for ContentTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ContentTypeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContentTypeId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A locale code as the source spells it, e.g. `en-US` or `de_DE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocaleCode(pub String);

impl LocaleCode {
    /// Lower-cased code with `_` region separators normalised to `-`.
    pub fn normalized(&self) -> String {
        self.0.replace('_', "-").to_lowercase()
    }
}

impl fmt::Display for LocaleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for LocaleCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for LocaleCode {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Source records
// ---------------------------------------------------------------------------

/// A language/region variant. Exactly one locale per space is the default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    pub code: LocaleCode,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_code: Option<LocaleCode>,
}

impl Locale {
    pub fn new(code: impl Into<String>, default: bool) -> Self {
        let code = code.into();
        Self {
            name: code.clone(),
            code: LocaleCode(code),
            default,
            fallback_code: None,
        }
    }
}

/// `{ "sys": { "id": ..., "linkType": ..., "type": "Link" } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub sys: LinkSys,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkSys {
    pub id: String,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

/// System metadata of a raw entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntrySys {
    pub id: EntryId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<Link>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

/// One content record as fetched from the source.
///
/// `fields` maps a field id to a per-locale value map:
/// `{ "title": { "en-US": "Hello", "de-DE": "Hallo" } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub sys: EntrySys,
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl Entry {
    pub fn id(&self) -> &EntryId {
        &self.sys.id
    }

    /// Content type id from `sys.contentType.sys.id`, if the link is present.
    pub fn content_type_id(&self) -> Option<ContentTypeId> {
        self.sys
            .content_type
            .as_ref()
            .map(|link| ContentTypeId(link.sys.id.clone()))
    }

    /// The `sys` metadata block attached to mapped content.
    pub fn sys_metadata(&self, content_type: &ContentTypeId) -> Value {
        let mut sys = Map::new();
        sys.insert("id".into(), Value::String(self.sys.id.0.clone()));
        sys.insert("contentType".into(), Value::String(content_type.0.clone()));
        if let Some(created) = self.sys.created_at {
            sys.insert("createdAt".into(), Value::String(iso_timestamp(created)));
        }
        if let Some(updated) = self.sys.updated_at {
            sys.insert("updatedAt".into(), Value::String(iso_timestamp(updated)));
        }
        Value::Object(sys)
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix, the form CMS APIs emit.
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Field declaration inside a content type schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub localized: bool,
    #[serde(default)]
    pub omitted: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeSys {
    pub id: ContentTypeId,
}

/// A content type schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentType {
    pub sys: ContentTypeSys,
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_field: Option<String>,
    #[serde(default)]
    pub fields: Vec<FieldDef>,
}

impl ContentType {
    pub fn id(&self) -> &ContentTypeId {
        &self.sys.id
    }
}

// ---------------------------------------------------------------------------
// Transform context
// ---------------------------------------------------------------------------

/// Working state for one (entry, locale) pair.
///
/// Created by the transform task, consumed by the write task. `content`
/// starts as the mapped entry and is replaced by each `transform` hook in
/// turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformContext {
    pub id: EntryId,
    pub locale: Locale,
    pub content_type_id: ContentTypeId,
    pub entry: Entry,
    pub content: Value,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn newtype_display() {
        assert_eq!(EntryId::from("abc").to_string(), "abc");
        assert_eq!(ContentTypeId::from("post").to_string(), "post");
        assert_eq!(LocaleCode::from("en-US").to_string(), "en-US");
    }

    #[test]
    fn locale_code_normalizes_region_separator() {
        assert_eq!(LocaleCode::from("de_DE").normalized(), "de-de");
        assert_eq!(LocaleCode::from("en-US").normalized(), "en-us");
    }

    #[test]
    fn entry_deserializes_from_export_shape() {
        let raw = json!({
            "sys": {
                "id": "post-1",
                "contentType": { "sys": { "id": "post", "type": "Link", "linkType": "ContentType" } },
                "createdAt": "2021-03-04T10:00:00.123Z",
                "updatedAt": "2021-03-05T11:30:00.000Z"
            },
            "fields": { "title": { "en-US": "Hello" } }
        });
        let entry: Entry = serde_json::from_value(raw).expect("entry");
        assert_eq!(entry.id().0, "post-1");
        assert_eq!(entry.content_type_id(), Some(ContentTypeId::from("post")));

        let sys = entry.sys_metadata(&ContentTypeId::from("post"));
        assert_eq!(sys["createdAt"], json!("2021-03-04T10:00:00.123Z"));
        assert_eq!(sys["updatedAt"], json!("2021-03-05T11:30:00.000Z"));
    }

    #[test]
    fn locale_defaults_when_optional_fields_missing() {
        let locale: Locale = serde_json::from_value(json!({ "code": "fr" })).expect("locale");
        assert!(!locale.default);
        assert!(locale.fallback_code.is_none());
    }
}
