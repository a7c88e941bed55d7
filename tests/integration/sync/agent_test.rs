//! Client sync agent tests against a scripted HTTP server
//!
//! These drive the full background driver (state machine + transport +
//! local store) against wiremock. The scripted `/events` endpoint closes
//! immediately after responding, so the agent cycles through
//! Connected/Disconnected; the tests assert on what must hold across
//! those cycles: pushes happen, device fields never leave the device,
//! and intents survive outages.

use std::time::Duration;

use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use choresync::client::backoff::Backoff;
use choresync::client::{HttpTransport, LocalStore, SyncDriver, SyncHandle};

use crate::common::wait_until;

fn sse_ok() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(Vec::<u8>::new(), "text/event-stream")
}

async fn start_agent(mock: &MockServer, dir: &tempfile::TempDir) -> SyncHandle {
    let local = LocalStore::open(dir.path().join("local-data.json")).unwrap();
    let transport =
        HttpTransport::new(&mock.uri(), Duration::from_secs(2), Duration::from_secs(2)).unwrap();
    let backoff = Backoff::new(Duration::from_millis(50), Duration::from_millis(200));
    let (handle, driver) = SyncDriver::new(local, Some(transport), backoff);
    tokio::spawn(driver.run());
    handle
}

async fn put_bodies(mock: &MockServer) -> Vec<Value> {
    mock.received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|req| req.method.to_string().eq_ignore_ascii_case("put"))
        .map(|req| serde_json::from_slice(&req.body).expect("PUT bodies are JSON"))
        .collect()
}

#[tokio::test]
async fn test_mutation_is_pushed_with_device_fields_stripped() {
    let mock = MockServer::start().await;
    Mock::given(method("GET")).and(path("/events")).respond_with(sse_ok()).mount(&mock).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_version": 0 })))
        .mount(&mock)
        .await;
    Mock::given(method("PUT"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "_version": 1, "users": ["Alice"] })),
        )
        .mount(&mock)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let handle = start_agent(&mock, &dir).await;

    handle
        .mutate(|doc| {
            doc.fields.insert("users".into(), json!(["Alice"]));
            doc.fields.insert("selectedUser".into(), json!("Alice"));
            doc.fields.insert("theme".into(), json!("dark"));
        })
        .unwrap();

    // The push shows up, sooner or later
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    let body = loop {
        if let Some(body) = put_bodies(&mock).await.into_iter().next() {
            break body;
        }
        assert!(tokio::time::Instant::now() < deadline, "no PUT observed");
        tokio::time::sleep(Duration::from_millis(25)).await;
    };

    // The shared state went out; the per-device fields did not
    assert_eq!(body["users"], json!(["Alice"]));
    assert!(body.get("selectedUser").is_none());
    assert!(body.get("theme").is_none());

    // Locally they are still there
    let document = handle.document().unwrap();
    assert_eq!(document.fields["selectedUser"], json!("Alice"));
    assert_eq!(document.fields["theme"], json!("dark"));
}

#[tokio::test]
async fn test_intent_survives_outage_and_repushes() {
    let mock = MockServer::start().await;
    Mock::given(method("GET")).and(path("/events")).respond_with(sse_ok()).mount(&mock).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_version": 0 })))
        .mount(&mock)
        .await;
    // The first two pushes hit a broken server, then it recovers
    Mock::given(method("PUT"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock)
        .await;
    Mock::given(method("PUT"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_version": 1 })))
        .mount(&mock)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let handle = start_agent(&mock, &dir).await;

    handle
        .mutate(|doc| {
            doc.fields.insert("users".into(), json!(["Carol"]));
        })
        .unwrap();

    // The mutation is acknowledged eventually: the local document adopts
    // the server's version stamp once a push finally lands.
    wait_until("acknowledged push", || {
        handle.document().map(|d| d.version == 1).unwrap_or(false)
    })
    .await;

    // It took more than one attempt
    assert!(put_bodies(&mock).await.len() >= 2);

    // And the mutation itself was never lost
    let document = handle.document().unwrap();
    assert_eq!(document.fields["users"], json!(["Carol"]));
}

#[tokio::test]
async fn test_connect_pulls_remote_document() {
    let mock = MockServer::start().await;
    Mock::given(method("GET")).and(path("/events")).respond_with(sse_ok()).mount(&mock).await;
    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "_version": 5, "users": ["Bob"], "theme": "light" })),
        )
        .mount(&mock)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let handle = start_agent(&mock, &dir).await;

    // With no local edits, the pulled document replaces local state -
    // minus the other device's local-only fields.
    wait_until("initial pull", || {
        handle.document().map(|d| d.version == 5).unwrap_or(false)
    })
    .await;

    let document = handle.document().unwrap();
    assert_eq!(document.fields["users"], json!(["Bob"]));
    assert!(document.fields.get("theme").is_none());
}

#[tokio::test]
async fn test_unreachable_server_stays_local_only() {
    // Nothing is listening on this address; the agent must degrade to
    // local-only operation without surfacing any error.
    let local_dir = tempfile::tempdir().unwrap();
    let local = LocalStore::open(local_dir.path().join("local-data.json")).unwrap();
    let transport = HttpTransport::new(
        "http://127.0.0.1:9",
        Duration::from_millis(200),
        Duration::from_millis(200),
    )
    .unwrap();
    let backoff = Backoff::new(Duration::from_millis(50), Duration::from_millis(100));
    let (handle, driver) = SyncDriver::new(local, Some(transport), backoff);
    tokio::spawn(driver.run());

    let updated = handle
        .mutate(|doc| {
            doc.fields.insert("users".into(), json!(["Dana"]));
        })
        .unwrap();
    assert_eq!(updated.fields["users"], json!(["Dana"]));

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert!(!handle.health().is_connected());
    assert_eq!(handle.document().unwrap().fields["users"], json!(["Dana"]));
}
