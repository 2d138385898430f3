//! Roundtrip tests: `parse(stringify(x)) == x` for every format.
//!
//! Each `#[case]` is isolated with no shared state.

use folio_convert::{Converter, Format};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn nested_entry() -> Value {
    json!({
        "title": "Release notes",
        "slug": "release-notes",
        "rating": 4.5,
        "views": 1200,
        "published": true,
        "sys": {
            "id": "6KntaYXaHSyIw8M6eo26OK",
            "contentType": "post",
            "createdAt": "2021-03-04T10:00:00.123Z",
            "updatedAt": "2021-03-05T11:30:00.000Z"
        },
        "tags": ["rust", "cms", "static"],
        "author": { "name": "Ada", "links": [{ "href": "https://example.com", "rel": "me" }] }
    })
}

fn multi_locale_map() -> Value {
    json!({
        "title": { "en-US": "Hello", "de-DE": "Hallo", "fr": "Bonjour" },
        "body": { "en-US": "Text", "de-DE": "Text (de)" }
    })
}

fn unicode_entry() -> Value {
    json!({
        "title": "アプリ-проект-项目",
        "emoji": "🚀 launch",
        "quote": "she said \"hi\"\nthen left",
        "path": "C:\\content\\posts"
    })
}

fn markdown_entry() -> Value {
    json!({
        "title": "With body",
        "tags": ["a"],
        "content": "# Heading\n\nParagraph with *emphasis*.\n\n---\n\nAfter a rule.\n"
    })
}

fn roundtrip(value: &Value, format: Format) -> Value {
    let converter = Converter::new();
    let text = converter
        .stringify(value, format)
        .unwrap_or_else(|e| panic!("stringify {format}: {e}"));
    converter
        .parse(&text, format)
        .unwrap_or_else(|e| panic!("parse {format}: {e}\n---\n{text}"))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::toml(Format::Toml)]
#[case::markdown(Format::Markdown)]
fn nested_objects_survive(#[case] format: Format) {
    let value = nested_entry();
    assert_eq!(roundtrip(&value, format), value);
}

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::toml(Format::Toml)]
#[case::markdown(Format::Markdown)]
fn multi_locale_maps_survive(#[case] format: Format) {
    let value = multi_locale_map();
    assert_eq!(roundtrip(&value, format), value);
}

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::toml(Format::Toml)]
#[case::markdown(Format::Markdown)]
fn unicode_strings_survive(#[case] format: Format) {
    let value = unicode_entry();
    assert_eq!(roundtrip(&value, format), value);
}

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::toml(Format::Toml)]
#[case::markdown(Format::Markdown)]
fn markdown_body_field_survives(#[case] format: Format) {
    let value = markdown_entry();
    assert_eq!(roundtrip(&value, format), value);
}

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::markdown(Format::Markdown)]
fn nulls_survive_where_the_format_has_them(#[case] format: Format) {
    let value = json!({ "subtitle": null, "list": [1, null, 3] });
    assert_eq!(roundtrip(&value, format), value);
}

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::toml(Format::Toml)]
#[case::markdown(Format::Markdown)]
fn stringify_is_deterministic(#[case] format: Format) {
    let converter = Converter::new();
    let first = converter.stringify(&nested_entry(), format).unwrap();
    let second = converter.stringify(&nested_entry(), format).unwrap();
    assert_eq!(first, second);
}

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::toml(Format::Toml)]
#[case::markdown(Format::Markdown)]
fn empty_body_field_survives(#[case] format: Format) {
    let value = json!({ "title": "t", "content": "" });
    assert_eq!(roundtrip(&value, format), value);
}

#[rstest]
#[case::json(Format::Json)]
#[case::yaml(Format::Yaml)]
#[case::markdown(Format::Markdown)]
fn null_document_survives(#[case] format: Format) {
    assert_eq!(roundtrip(&Value::Null, format), Value::Null);
}
