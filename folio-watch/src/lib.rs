//! Webhook-driven resync: an axum listener feeding a debounced resync
//! processor.

mod error;
mod runtime;
pub mod server;

pub use error::WatchError;
pub use runtime::{init_tracing, run, ResyncFn, WatchOptions, DEBOUNCE_WINDOW};
pub use server::{build_router, ResyncRequest, Trigger, WebhookState};
