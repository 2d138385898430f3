//! Raw entry → per-locale content.

use std::collections::HashSet;

use serde_json::{Map, Value};

use folio_core::{ContentType, Entry, Locale, LocaleCode};

/// Turns a raw source entry into the plain content object for one locale.
///
/// The pipeline holds one boxed mapper per run; swap it to change how field
/// values are resolved.
pub trait EntryMapper: Send + Sync {
    fn map(&self, entry: &Entry, locale: &Locale, schema: Option<&ContentType>) -> Value;
}

/// Default mapper for `{ field: { locale: value } }` entries.
///
/// A field value is looked up under the requested locale, then along its
/// `fallback_code` chain, then under the default locale. Values that are
/// not locale maps pass through unchanged. With a schema, only declared
/// fields that are not `omitted` are mapped.
#[derive(Debug, Clone)]
pub struct FieldMapper {
    locales: Vec<Locale>,
}

impl FieldMapper {
    pub fn new(locales: Vec<Locale>) -> Self {
        Self { locales }
    }

    fn default_locale(&self) -> Option<&Locale> {
        self.locales
            .iter()
            .find(|l| l.default)
            .or_else(|| self.locales.first())
    }

    fn find(&self, code: &LocaleCode) -> Option<&Locale> {
        self.locales.iter().find(|l| &l.code == code)
    }

    /// Codes to try for `locale`, most specific first, without repeats.
    fn lookup_order<'a>(&'a self, locale: &'a Locale) -> Vec<&'a str> {
        let mut order: Vec<&'a str> = Vec::new();
        let mut seen = HashSet::new();
        let mut current = Some(locale);
        while let Some(l) = current {
            if !seen.insert(l.code.0.as_str()) {
                break;
            }
            order.push(l.code.0.as_str());
            current = l.fallback_code.as_ref().and_then(|code| self.find(code));
        }
        if let Some(default) = self.default_locale() {
            if seen.insert(default.code.0.as_str()) {
                order.push(default.code.0.as_str());
            }
        }
        order
    }

    fn is_locale_map(&self, fields: &Map<String, Value>) -> bool {
        !fields.is_empty()
            && fields
                .keys()
                .all(|key| self.locales.iter().any(|l| l.code.0 == *key))
    }

    fn resolve(&self, raw: &Value, order: &[&str]) -> Option<Value> {
        match raw {
            Value::Object(by_locale) if self.is_locale_map(by_locale) => order
                .iter()
                .find_map(|code| by_locale.get(*code))
                .cloned(),
            other => Some(other.clone()),
        }
    }
}

impl EntryMapper for FieldMapper {
    fn map(&self, entry: &Entry, locale: &Locale, schema: Option<&ContentType>) -> Value {
        let order = self.lookup_order(locale);
        let mut content = Map::new();

        match schema {
            Some(schema) => {
                for field in schema.fields.iter().filter(|f| !f.omitted) {
                    if let Some(value) = entry
                        .fields
                        .get(&field.id)
                        .and_then(|raw| self.resolve(raw, &order))
                    {
                        content.insert(field.id.clone(), value);
                    }
                }
            }
            None => {
                for (id, raw) in &entry.fields {
                    if let Some(value) = self.resolve(raw, &order) {
                        content.insert(id.clone(), value);
                    }
                }
            }
        }

        Value::Object(content)
    }
}
