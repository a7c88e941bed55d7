//! REST endpoint integration tests

use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use uuid::Uuid;

use choresync::backend::AppState;
use choresync::shared::event::CLIENT_ID_HEADER;

use crate::common::{memory_state, test_server, FailingStore};

#[tokio::test]
async fn test_empty_store_returns_default_document() {
    let server = test_server(memory_state());

    let response = server.get("/data").await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "_version": 0 }));
}

#[tokio::test]
async fn test_put_stamps_strictly_increasing_versions() {
    let server = test_server(memory_state());

    let response = server
        .put("/data")
        .json(&json!({ "rooms": [], "users": ["Alice"] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["_version"], json!(1));
    assert_eq!(body["users"], json!(["Alice"]));

    let body: Value = server.get("/data").await.json();
    assert_eq!(body, json!({ "_version": 1, "rooms": [], "users": ["Alice"] }));

    let response = server
        .put("/data")
        .json(&json!({ "rooms": [], "users": ["Alice", "Bob"] }))
        .await;
    let body: Value = response.json();
    assert_eq!(body["_version"], json!(2));
}

#[tokio::test]
async fn test_get_after_put_returns_body_plus_stamp() {
    let server = test_server(memory_state());

    let pushed = json!({
        "rooms": [{"id": "kitchen", "name": "Kitchen"}],
        "completions": {"2026-08-07": {"kitchen": true}},
        "settings": {"gradientDays": 7},
    });
    server.put("/data").json(&pushed).await.assert_status_ok();

    let mut expected = pushed.clone();
    expected["_version"] = json!(1);
    let body: Value = server.get("/data").await.json();
    assert_eq!(body, expected);
}

#[tokio::test]
async fn test_malformed_put_has_no_side_effects() {
    let server = test_server(memory_state());
    server
        .put("/data")
        .json(&json!({ "users": ["Alice"] }))
        .await
        .assert_status_ok();

    // Not JSON at all
    let response = server.put("/data").text("{ not json").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // JSON, but not an object
    let response = server.put("/data").json(&json!([1, 2, 3])).await;
    response.assert_status(StatusCode::BAD_REQUEST);

    // The stored document is untouched and the version did not move
    let body: Value = server.get("/data").await.json();
    assert_eq!(body, json!({ "_version": 1, "users": ["Alice"] }));
}

#[tokio::test]
async fn test_stale_version_in_body_is_overwritten_not_rejected() {
    let server = test_server(memory_state());
    server.put("/data").json(&json!({})).await.assert_status_ok();

    // Last-writer-wins: a stale or bogus client-side _version never causes
    // rejection; the server stamps its own.
    let response = server
        .put("/data")
        .json(&json!({ "_version": 999, "users": ["Bob"] }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["_version"], json!(2));
}

#[tokio::test]
async fn test_persistence_failure_maps_to_server_error() {
    let state = AppState::new(Arc::new(FailingStore));
    let mut notices = state.changes.subscribe();
    let server = test_server(state);

    let response = server.put("/data").json(&json!({ "users": [] })).await;
    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

    // A failed write must not notify anyone
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn test_put_broadcasts_before_responding() {
    let state = memory_state();
    let mut notices = state.changes.subscribe();
    let server = test_server(state);

    server
        .put("/data")
        .json(&json!({ "users": [] }))
        .await
        .assert_status_ok();

    // The notice is already in the channel by the time PUT returned
    let notice = notices.try_recv().expect("notice should precede response");
    assert_eq!(notice.version(), 1);
    assert_eq!(notice.origin(), None);
}

#[tokio::test]
async fn test_put_records_origin_header() {
    let state = memory_state();
    let mut notices = state.changes.subscribe();
    let server = test_server(state);

    let origin = Uuid::new_v4();
    server
        .put("/data")
        .add_header(
            HeaderName::from_static(CLIENT_ID_HEADER),
            HeaderValue::from_str(&origin.to_string()).unwrap(),
        )
        .json(&json!({ "users": [] }))
        .await
        .assert_status_ok();

    let notice = notices.try_recv().unwrap();
    assert_eq!(notice.origin(), Some(origin));
}

#[tokio::test]
async fn test_version_probe() {
    let server = test_server(memory_state());
    let body: Value = server.get("/version").await.json();
    assert_eq!(body, json!({ "version": env!("CARGO_PKG_VERSION") }));
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let server = test_server(memory_state());
    server.get("/nope").await.assert_status(StatusCode::NOT_FOUND);
}
