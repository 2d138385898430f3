//! Where content comes from.
//!
//! [`ContentSource`] is the paged-fetch seam a CMS client implements.
//! [`fetch_all`] drains every collection a run needs. [`SnapshotSource`]
//! serves a CMS export document, which is what the CLI and the tests use.

use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use folio_core::{ContentType, Entry, Locale};

use crate::error::FetchError;

pub const DEFAULT_PAGE_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub skip: usize,
    pub limit: usize,
}

impl PageRequest {
    pub fn first(limit: usize) -> Self {
        Self { skip: 0, limit }
    }

    pub fn next(self) -> Self {
        Self {
            skip: self.skip + self.limit,
            limit: self.limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self { items }
    }
}

/// Paged read access to a content space.
///
/// A page shorter than `limit` marks the end of a collection.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn locales(&self, page: PageRequest) -> Result<Page<Locale>, FetchError>;

    async fn content_types(&self, page: PageRequest) -> Result<Page<ContentType>, FetchError>;

    async fn entries(&self, page: PageRequest) -> Result<Page<Entry>, FetchError>;
}

/// Everything a run exports, fully fetched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fetched {
    pub locales: Vec<Locale>,
    pub content_types: Vec<ContentType>,
    pub entries: Vec<Entry>,
}

/// Page through every collection of `source`.
///
/// Fails with [`FetchError::NoLocales`] when the space has no locales.
pub async fn fetch_all(
    source: &dyn ContentSource,
    page_size: usize,
) -> Result<Fetched, FetchError> {
    let page_size = page_size.max(1);

    let mut locales = Vec::new();
    let mut request = PageRequest::first(page_size);
    loop {
        let page = source.locales(request).await?;
        let done = page.items.len() < page_size;
        locales.extend(page.items);
        if done {
            break;
        }
        request = request.next();
    }
    if locales.is_empty() {
        return Err(FetchError::NoLocales);
    }

    let mut content_types = Vec::new();
    let mut request = PageRequest::first(page_size);
    loop {
        let page = source.content_types(request).await?;
        let done = page.items.len() < page_size;
        content_types.extend(page.items);
        if done {
            break;
        }
        request = request.next();
    }

    let mut entries = Vec::new();
    let mut request = PageRequest::first(page_size);
    loop {
        let page = source.entries(request).await?;
        let done = page.items.len() < page_size;
        entries.extend(page.items);
        if done {
            break;
        }
        request = request.next();
    }

    tracing::debug!(
        locales = locales.len(),
        content_types = content_types.len(),
        entries = entries.len(),
        "fetched content"
    );

    Ok(Fetched {
        locales,
        content_types,
        entries,
    })
}

// ---------------------------------------------------------------------------
// Snapshot source
// ---------------------------------------------------------------------------

/// A CMS export document: `{ "locales": [], "contentTypes": [], "entries": [] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default)]
    pub locales: Vec<Locale>,
    #[serde(default)]
    pub content_types: Vec<ContentType>,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

/// Serves a [`Snapshot`] from memory.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSource {
    snapshot: Snapshot,
}

impl SnapshotSource {
    pub fn new(snapshot: Snapshot) -> Self {
        Self { snapshot }
    }

    pub async fn from_path(path: &Path) -> Result<Self, FetchError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, FetchError> {
        Ok(Self::new(serde_json::from_str(text)?))
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }
}

fn page_of<T: Clone>(items: &[T], request: PageRequest) -> Page<T> {
    Page::new(
        items
            .iter()
            .skip(request.skip)
            .take(request.limit)
            .cloned()
            .collect(),
    )
}

#[async_trait]
impl ContentSource for SnapshotSource {
    async fn locales(&self, page: PageRequest) -> Result<Page<Locale>, FetchError> {
        Ok(page_of(&self.snapshot.locales, page))
    }

    async fn content_types(&self, page: PageRequest) -> Result<Page<ContentType>, FetchError> {
        Ok(page_of(&self.snapshot.content_types, page))
    }

    async fn entries(&self, page: PageRequest) -> Result<Page<Entry>, FetchError> {
        Ok(page_of(&self.snapshot.entries, page))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
