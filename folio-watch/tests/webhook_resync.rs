//! A webhook hitting the router ends in a real export run.

use std::fs;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::json;
use tempfile::TempDir;
use tokio::sync::mpsc;
use tokio_test::assert_ok;
use tower::util::ServiceExt;

use folio_core::Config;
use folio_sync::{Snapshot, SnapshotSource};
use folio_watch::{build_router, Trigger, WebhookState};

fn source(title: &str) -> SnapshotSource {
    let snapshot: Snapshot = serde_json::from_value(json!({
        "locales": [{ "code": "en-US", "default": true }],
        "contentTypes": [],
        "entries": [{
            "sys": { "id": "welcome", "contentType": { "sys": { "id": "page" } } },
            "fields": { "title": { "en-US": title } }
        }]
    }))
    .unwrap();
    SnapshotSource::new(snapshot)
}

#[tokio::test]
async fn webhook_queues_a_resync_that_exports_the_change() {
    let out = TempDir::new().unwrap();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let app = build_router(WebhookState::new(tx));

    let response = app
        .oneshot(
            Request::post("/")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"sys":{"id":"welcome"}}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let request = rx.recv().await.unwrap();
    assert_eq!(
        request.trigger,
        Trigger::Webhook {
            entity_id: "welcome".into()
        }
    );

    let report = assert_ok!(folio_sync::run(Config::new(out.path()), &source("Welcome")).await);
    assert_eq!(report.summary.totals.created, 1);
    let written = fs::read_to_string(out.path().join("page/welcome.yaml")).unwrap();
    assert!(written.contains("title: Welcome"));
}
