//! Webhook listener.
//!
//! | Request                               | Response    | Resync |
//! |---------------------------------------|-------------|--------|
//! | `GET /status`                         | 200 `ok`    | no     |
//! | `GET /`                               | 200 `ok`    | yes    |
//! | `POST /` with a non-null `sys.id`     | 200 `ok`    | yes    |
//! | `POST /` with anything else           | 401 `error` | no     |
//!
//! Triggering only enqueues a [`ResyncRequest`]; the response never waits
//! for the resync itself.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use tokio::sync::mpsc;

/// What caused a resync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// The runtime's startup sync.
    Initial,
    /// A bare `GET /`.
    Ping,
    /// A CMS webhook naming the changed entity.
    Webhook { entity_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResyncRequest {
    pub trigger: Trigger,
}

impl ResyncRequest {
    pub fn new(trigger: Trigger) -> Self {
        Self { trigger }
    }
}

/// Shared handler state: the sending half of the resync queue.
#[derive(Debug, Clone)]
pub struct WebhookState {
    resync_tx: mpsc::UnboundedSender<ResyncRequest>,
}

impl WebhookState {
    pub fn new(resync_tx: mpsc::UnboundedSender<ResyncRequest>) -> Self {
        Self { resync_tx }
    }

    fn trigger(&self, trigger: Trigger) {
        tracing::info!(?trigger, "resync requested");
        if self.resync_tx.send(ResyncRequest::new(trigger)).is_err() {
            tracing::warn!("resync processor is gone; request dropped");
        }
    }
}

pub fn build_router(state: WebhookState) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/", get(ping).post(webhook))
        .with_state(state)
}

async fn status() -> &'static str {
    "ok"
}

async fn ping(State(state): State<WebhookState>) -> &'static str {
    state.trigger(Trigger::Ping);
    "ok"
}

async fn webhook(State(state): State<WebhookState>, body: Bytes) -> (StatusCode, &'static str) {
    match entity_id(&body) {
        Some(entity_id) => {
            state.trigger(Trigger::Webhook { entity_id });
            (StatusCode::OK, "ok")
        }
        None => {
            tracing::warn!(bytes = body.len(), "rejected webhook without sys.id");
            (StatusCode::UNAUTHORIZED, "error")
        }
    }
}

/// `sys.id` of a webhook payload, if the body is JSON and carries one.
fn entity_id(body: &[u8]) -> Option<String> {
    let payload: Value = serde_json::from_slice(body).ok()?;
    match payload.get("sys")?.get("id")? {
        Value::Null => None,
        Value::String(id) => Some(id.clone()),
        other => Some(other.to_string()),
    }
}
