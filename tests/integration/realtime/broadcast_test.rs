//! Real-time channel integration tests
//!
//! These run the server on a real socket and drive it with the client
//! transport, exercising the SSE path end to end.

use std::time::Duration;

use axum::http::StatusCode;
use futures_util::StreamExt;
use serde_json::json;

use choresync::client::HttpTransport;
use choresync::shared::Document;

use crate::common::{memory_state, spawn_live_server, test_server};

fn transport(url: &str) -> HttpTransport {
    HttpTransport::new(url, Duration::from_secs(5), Duration::from_secs(5))
        .expect("transport should build")
}

fn doc(value: serde_json::Value) -> Document {
    serde_json::from_value(value).unwrap()
}

#[tokio::test]
async fn test_subscription_requires_subscribe_header() {
    let server = test_server(memory_state());
    let response = server.get("/events").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_writer_notifies_other_subscriber() {
    let url = spawn_live_server(memory_state()).await;
    let writer = transport(&url);
    let reader = transport(&url);

    let mut notices = reader.subscribe().await.expect("handshake");

    let stamped = writer
        .push(doc(json!({ "users": ["Alice"] })))
        .await
        .expect("push");
    assert_eq!(stamped.version, 1);

    let notice = tokio::time::timeout(Duration::from_secs(5), notices.next())
        .await
        .expect("notice within the timeout window")
        .expect("stream still open")
        .expect("well-formed notice");
    assert_eq!(notice.version(), 1);

    // The follow-up pull reflects the writer's change
    let pulled = reader.fetch().await.expect("fetch");
    assert_eq!(pulled.version, 1);
    assert_eq!(pulled.fields["users"], json!(["Alice"]));
}

#[tokio::test]
async fn test_originator_does_not_hear_its_own_change() {
    let url = spawn_live_server(memory_state()).await;
    let writer = transport(&url);
    let other = transport(&url);

    let mut notices = writer.subscribe().await.expect("handshake");

    writer
        .push(doc(json!({ "users": ["Alice"] })))
        .await
        .expect("push");

    // No echo of the writer's own change
    let echo = tokio::time::timeout(Duration::from_millis(300), notices.next()).await;
    assert!(echo.is_err(), "writer should not be notified of its own PUT");

    // A change from another client does come through
    other
        .push(doc(json!({ "users": ["Alice", "Bob"] })))
        .await
        .expect("push");
    let notice = tokio::time::timeout(Duration::from_secs(5), notices.next())
        .await
        .expect("notice within the timeout window")
        .expect("stream still open")
        .expect("well-formed notice");
    assert_eq!(notice.version(), 2);
}

#[tokio::test]
async fn test_new_subscriber_gets_no_backlog() {
    let url = spawn_live_server(memory_state()).await;
    let writer = transport(&url);

    writer.push(doc(json!({ "users": ["Alice"] }))).await.expect("push");

    // Subscribing after the write: no replay, the subscriber is expected
    // to pull on its own.
    let late = transport(&url);
    let mut notices = late.subscribe().await.expect("handshake");
    let replay = tokio::time::timeout(Duration::from_millis(300), notices.next()).await;
    assert!(replay.is_err(), "no backlog should be replayed");

    let pulled = late.fetch().await.expect("fetch");
    assert_eq!(pulled.version, 1);
}
