//! Plugin handles: the hook contract consumed by the sync pipeline.
//!
//! A [`Plugin`] is a name plus an optional implementation per hook name.
//! Implementations are async closures returning a [`BoxFuture`]; each hook
//! also has a `*_sync` builder for plain functions.
//!
//! ```rust
//! use folio_core::Plugin;
//! use serde_json::{json, Value};
//!
//! let plugin = Plugin::new("stamp")
//!     .transform_sync(|_ctx, mut value: Value| {
//!         value["stamped"] = json!(true);
//!         Ok(value)
//!     })
//!     .map_directory_sync(|ctx, _default| Some(format!("content/{}", ctx.content_type_id)));
//! assert!(plugin.has_transform());
//! ```

use std::fmt;
use std::sync::Arc;

use futures::future::{self, BoxFuture};
use serde_json::Value;

use crate::config::Config;
use crate::report::StatsSummary;
use crate::types::TransformContext;

/// Error type plugin implementations return.
pub type HookFailure = Box<dyn std::error::Error + Send + Sync>;

pub type HookResult<T> = Result<T, HookFailure>;

/// `transform(context, currentValue) -> value`
pub type TransformHook = Arc<
    dyn for<'a> Fn(&'a TransformContext, Value) -> BoxFuture<'a, HookResult<Value>> + Send + Sync,
>;

/// `mapDirectory` / `mapFilename`: `None` leaves the current value untouched.
pub type ResolveHook = Arc<
    dyn for<'a> Fn(&'a TransformContext, &'a str) -> BoxFuture<'a, HookResult<Option<String>>>
        + Send
        + Sync,
>;

pub type BeforeRunHook =
    Arc<dyn for<'a> Fn(&'a Config) -> BoxFuture<'a, HookResult<()>> + Send + Sync>;

pub type AfterRunHook =
    Arc<dyn for<'a> Fn(&'a StatsSummary) -> BoxFuture<'a, HookResult<()>> + Send + Sync>;

/// One registered plugin.
#[derive(Clone)]
pub struct Plugin {
    name: String,
    transform: Option<TransformHook>,
    map_directory: Option<ResolveHook>,
    map_filename: Option<ResolveHook>,
    before_run: Option<BeforeRunHook>,
    after_run: Option<AfterRunHook>,
}

impl Plugin {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transform: None,
            map_directory: None,
            map_filename: None,
            before_run: None,
            after_run: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // -- transform ----------------------------------------------------------

    pub fn transform<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a TransformContext, Value) -> BoxFuture<'a, HookResult<Value>>
            + Send
            + Sync
            + 'static,
    {
        self.transform = Some(Arc::new(hook));
        self
    }

    pub fn transform_sync<F>(self, hook: F) -> Self
    where
        F: Fn(&TransformContext, Value) -> HookResult<Value> + Send + Sync + 'static,
    {
        self.transform(move |ctx, value| Box::pin(future::ready(hook(ctx, value))))
    }

    pub fn transform_hook(&self) -> Option<&TransformHook> {
        self.transform.as_ref()
    }

    pub fn has_transform(&self) -> bool {
        self.transform.is_some()
    }

    // -- mapDirectory -------------------------------------------------------

    pub fn map_directory<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a TransformContext, &'a str) -> BoxFuture<'a, HookResult<Option<String>>>
            + Send
            + Sync
            + 'static,
    {
        self.map_directory = Some(Arc::new(hook));
        self
    }

    pub fn map_directory_sync<F>(self, hook: F) -> Self
    where
        F: Fn(&TransformContext, &str) -> Option<String> + Send + Sync + 'static,
    {
        self.map_directory(move |ctx, current| {
            Box::pin(future::ready(Ok::<_, HookFailure>(hook(ctx, current))))
        })
    }

    pub fn map_directory_hook(&self) -> Option<&ResolveHook> {
        self.map_directory.as_ref()
    }

    // -- mapFilename --------------------------------------------------------

    pub fn map_filename<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a TransformContext, &'a str) -> BoxFuture<'a, HookResult<Option<String>>>
            + Send
            + Sync
            + 'static,
    {
        self.map_filename = Some(Arc::new(hook));
        self
    }

    pub fn map_filename_sync<F>(self, hook: F) -> Self
    where
        F: Fn(&TransformContext, &str) -> Option<String> + Send + Sync + 'static,
    {
        self.map_filename(move |ctx, current| {
            Box::pin(future::ready(Ok::<_, HookFailure>(hook(ctx, current))))
        })
    }

    pub fn map_filename_hook(&self) -> Option<&ResolveHook> {
        self.map_filename.as_ref()
    }

    // -- lifecycle ----------------------------------------------------------

    pub fn before_run<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a Config) -> BoxFuture<'a, HookResult<()>> + Send + Sync + 'static,
    {
        self.before_run = Some(Arc::new(hook));
        self
    }

    pub fn before_run_hook(&self) -> Option<&BeforeRunHook> {
        self.before_run.as_ref()
    }

    pub fn after_run<F>(mut self, hook: F) -> Self
    where
        F: for<'a> Fn(&'a StatsSummary) -> BoxFuture<'a, HookResult<()>> + Send + Sync + 'static,
    {
        self.after_run = Some(Arc::new(hook));
        self
    }

    pub fn after_run_hook(&self) -> Option<&AfterRunHook> {
        self.after_run.as_ref()
    }
}

impl fmt::Debug for Plugin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Plugin")
            .field("name", &self.name)
            .field("transform", &self.transform.is_some())
            .field("map_directory", &self.map_directory.is_some())
            .field("map_filename", &self.map_filename.is_some())
            .field("before_run", &self.before_run.is_some())
            .field("after_run", &self.after_run.is_some())
            .finish()
    }
}
