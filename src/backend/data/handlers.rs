/**
 * Document REST Handlers
 *
 * This module implements the REST endpoint over the document store:
 * - GET /data - current document, including `_version`
 * - PUT /data - full-document replace; stamps, persists, broadcasts
 * - GET /version - build identity probe
 *
 * # Conflict Model
 *
 * PUT always replaces the entire document. There is no partial-update verb
 * and no stale-version rejection: the last writer to arrive wins, which
 * keeps the protocol free of any merge algorithm.
 */

use axum::{extract::State, http::HeaderMap, Json};
use bytes::Bytes;
use uuid::Uuid;

use crate::backend::error::BackendError;
use crate::backend::realtime::notify_change;
use crate::backend::server::state::{AppState, SharedStore};
use crate::shared::event::CLIENT_ID_HEADER;
use crate::shared::{ChannelMessage, Document};

/// Handle GET /data
///
/// Returns the current document. An empty store yields the initial default
/// document with `_version: 0`, so the version field is always present.
pub async fn handle_get_data(
    State(store): State<SharedStore>,
) -> Result<Json<Document>, BackendError> {
    let document = store.read()?;
    tracing::debug!("[Data] GET -> v{}", document.version);
    Ok(Json(document))
}

/// Handle PUT /data
///
/// Accepts a full replacement document, stamps the next version, persists
/// it, broadcasts a change notice, and returns the stamped document.
///
/// # Errors
///
/// * `400 Bad Request` - body is not a JSON object; nothing is written and
///   no notice is sent
/// * `500 Internal Server Error` - persistence failed; the previously
///   stored document is intact
pub async fn handle_put_data(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Document>, BackendError> {
    let candidate = Document::from_json_slice(&body)
        .map_err(|e| BackendError::malformed(e.to_string()))?;

    let origin = headers
        .get(CLIENT_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|raw| Uuid::parse_str(raw).ok());

    let stamped = state.store.write(candidate)?;
    tracing::info!(
        "[Data] PUT -> v{} ({} bytes, origin {:?})",
        stamped.version,
        body.len(),
        origin
    );

    // Notify before responding so "PUT returned" implies "peers were told"
    notify_change(&state.changes, ChannelMessage::data_changed(stamped.version, origin));

    Ok(Json(stamped))
}

/// Handle GET /version
///
/// Identity probe reporting the server build version.
pub async fn handle_version() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": env!("CARGO_PKG_VERSION") }))
}
