/**
 * Change Subscription Handler
 *
 * This module implements the Server-Sent Events (SSE) subscription handler
 * for the `/events` endpoint, the server-to-client half of the real-time
 * channel.
 *
 * # Connection Lifecycle
 *
 * A connection exists from the moment the stream starts until the client
 * goes away; there is no persisted identity and no backlog replay. A new
 * subscriber is expected to issue its own `GET /data` immediately after
 * connecting.
 *
 * # Originator Exclusion
 *
 * Clients may identify themselves with a `client` query parameter (the
 * same UUID they send as `X-Client-Id` on PUT). Notices whose origin
 * matches are skipped, so a writer is not told about its own change.
 *
 * # Connection Management
 *
 * - Idle connections are kept alive with SSE keep-alive comments
 * - A lagged receiver logs and keeps listening; the client will converge
 *   on its next pull
 * - Per-connection failures are isolated: each connection owns its own
 *   broadcast receiver
 */

use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::sse::{Event, KeepAlive, Sse},
};
use futures_util::stream;
use uuid::Uuid;

use crate::backend::realtime::broadcast::ChangeBroadcast;
use crate::shared::event::SUBSCRIBE_HEADER;

/// Handle a change subscription (GET /events)
///
/// # Query Parameters
///
/// - `client` - optional UUID identifying the subscriber; notices
///   originated by the same id are not delivered to it
///
/// # Headers
///
/// - `Subscribe:` - required header to initiate the subscription
///
/// # Returns
///
/// A Server-Sent Events stream of change notices:
///
/// ```http
/// HTTP/1.1 200 OK
/// Content-Type: text/event-stream
///
/// event: data-changed
/// data: {"type":"data-changed","version":7}
/// ```
///
/// # Errors
///
/// * `400 Bad Request` - if the Subscribe header is missing
pub async fn handle_events_subscription(
    State(changes): State<ChangeBroadcast>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Sse<impl tokio_stream::Stream<Item = Result<Event, axum::Error>>>, StatusCode> {
    if !headers.contains_key(SUBSCRIBE_HEADER) {
        tracing::warn!("[Realtime] Subscription request without Subscribe header");
        return Err(StatusCode::BAD_REQUEST);
    }

    let subscriber: Option<Uuid> = params
        .get("client")
        .and_then(|raw| Uuid::parse_str(raw).ok());

    match subscriber {
        Some(id) => tracing::info!("[Realtime] Subscription active for client {}", id),
        None => tracing::info!("[Realtime] Subscription active for anonymous client"),
    }

    let receiver = changes.subscribe();

    let stream = stream::unfold(
        (receiver, subscriber),
        move |(mut rx, subscriber)| async move {
            loop {
                match rx.recv().await {
                    Ok(notice) => {
                        if subscriber.is_some() && notice.origin() == subscriber {
                            tracing::debug!(
                                "[Realtime] Skipping echo of v{} to its originator",
                                notice.version()
                            );
                            continue;
                        }

                        let data = match serde_json::to_string(&notice) {
                            Ok(data) => data,
                            Err(e) => {
                                tracing::error!("[Realtime] Failed to serialize notice: {}", e);
                                continue;
                            }
                        };

                        let event = Event::default().event(notice.event_name()).data(data);
                        return Some((Ok(event), (rx, subscriber)));
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("[Realtime] Receiver lagged, skipped {} notices", skipped);
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => {
                        tracing::debug!("[Realtime] Broadcast channel closed, ending stream");
                        return None;
                    }
                }
            }
        },
    );

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
