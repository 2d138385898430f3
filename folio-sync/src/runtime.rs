//! Per-run context handed by reference to every task.

use std::collections::BTreeMap;

use folio_convert::Converter;
use folio_core::{Config, ContentType, ContentTypeId, Locale};

use crate::error::SyncError;
use crate::file_manager::FileManager;
use crate::hooks::HookManager;
use crate::mapper::{EntryMapper, FieldMapper};
use crate::stats::Stats;

/// Everything one run shares across its entry pipelines.
///
/// Built once by [`RuntimeContext::setup`], filled with fetched content by
/// [`RuntimeContext::with_content`], and then only read. Interior mutability
/// is limited to [`Stats`] and the [`FileManager`] touched set.
pub struct RuntimeContext {
    pub config: Config,
    pub file_manager: FileManager,
    pub stats: Stats,
    pub hooks: HookManager,
    pub converter: Converter,
    pub locales: Vec<Locale>,
    pub content_types: BTreeMap<ContentTypeId, ContentType>,
    pub mapper: Box<dyn EntryMapper>,
}

impl RuntimeContext {
    /// Validate `config` and prepare the output directory.
    pub async fn setup(config: Config) -> Result<Self, SyncError> {
        config.validate()?;

        let mut file_manager = FileManager::new(config.directory.clone(), config.dry_run);
        file_manager.initialize().await?;

        Ok(Self {
            hooks: HookManager::new(config.plugins.clone()),
            config,
            file_manager,
            stats: Stats::new(),
            converter: Converter::new(),
            locales: Vec::new(),
            content_types: BTreeMap::new(),
            mapper: Box::new(FieldMapper::new(Vec::new())),
        })
    }

    /// Install fetched locales and schemas.
    ///
    /// Without a `mapper`, a [`FieldMapper`] over `locales` is used. When no
    /// locale is flagged default, the first one is promoted. The default
    /// locale also labels unsuffixed orphans in the stats.
    pub fn with_content(
        mut self,
        mut locales: Vec<Locale>,
        content_types: Vec<ContentType>,
        mapper: Option<Box<dyn EntryMapper>>,
    ) -> Self {
        if !locales.iter().any(|l| l.default) {
            if let Some(first) = locales.first_mut() {
                tracing::warn!(
                    locale = %first.code,
                    "no default locale flagged; using the first locale"
                );
                first.default = true;
            }
        }

        if let Some(default) = locales.iter().find(|l| l.default) {
            self.file_manager
                .set_default_locale(default.code.normalized());
        }

        self.mapper = mapper.unwrap_or_else(|| Box::new(FieldMapper::new(locales.clone())));
        self.content_types = content_types
            .into_iter()
            .map(|ct| (ct.id().clone(), ct))
            .collect();
        self.locales = locales;
        self
    }

    pub fn schema(&self, id: &ContentTypeId) -> Option<&ContentType> {
        self.content_types.get(id)
    }
}
