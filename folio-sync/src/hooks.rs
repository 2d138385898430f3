//! Ordered invocation of plugin hooks.
//!
//! Hooks of one name form a chain in registration order. A plugin that does
//! not implement a hook is skipped. Every call is awaited before the next
//! starts, so later plugins always see earlier output.

use serde_json::Value;

use folio_core::{Config, Plugin, StatsSummary, TransformContext};

use crate::error::HookError;

#[derive(Debug, Clone, Default)]
pub struct HookManager {
    plugins: Vec<Plugin>,
}

impl HookManager {
    pub fn new(plugins: Vec<Plugin>) -> Self {
        Self { plugins }
    }

    pub fn plugins(&self) -> &[Plugin] {
        &self.plugins
    }

    /// Reducing chain: each `transform` receives the previous plugin's output.
    pub async fn transform(
        &self,
        ctx: &TransformContext,
        initial: Value,
    ) -> Result<Value, HookError> {
        let mut value = initial;
        for plugin in &self.plugins {
            if let Some(hook) = plugin.transform_hook() {
                value = hook(ctx, value)
                    .await
                    .map_err(|e| HookError::new(plugin.name(), "transform", e))?;
            }
        }
        Ok(value)
    }

    /// Resolving chain for the output directory. `None` from a plugin keeps
    /// the current value.
    pub async fn map_directory(
        &self,
        ctx: &TransformContext,
        default: String,
    ) -> Result<String, HookError> {
        let mut current = default;
        for plugin in &self.plugins {
            if let Some(hook) = plugin.map_directory_hook() {
                let resolved = hook(ctx, &current)
                    .await
                    .map_err(|e| HookError::new(plugin.name(), "map_directory", e))?;
                if let Some(next) = resolved {
                    current = next;
                }
            }
        }
        Ok(current)
    }

    /// Resolving chain for the output file name.
    pub async fn map_filename(
        &self,
        ctx: &TransformContext,
        default: String,
    ) -> Result<String, HookError> {
        let mut current = default;
        for plugin in &self.plugins {
            if let Some(hook) = plugin.map_filename_hook() {
                let resolved = hook(ctx, &current)
                    .await
                    .map_err(|e| HookError::new(plugin.name(), "map_filename", e))?;
                if let Some(next) = resolved {
                    current = next;
                }
            }
        }
        Ok(current)
    }

    pub async fn before_run(&self, config: &Config) -> Result<(), HookError> {
        for plugin in &self.plugins {
            if let Some(hook) = plugin.before_run_hook() {
                hook(config)
                    .await
                    .map_err(|e| HookError::new(plugin.name(), "before_run", e))?;
            }
        }
        Ok(())
    }

    pub async fn after_run(&self, summary: &StatsSummary) -> Result<(), HookError> {
        for plugin in &self.plugins {
            if let Some(hook) = plugin.after_run_hook() {
                hook(summary)
                    .await
                    .map_err(|e| HookError::new(plugin.name(), "after_run", e))?;
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
