/**
 * Change Notice Broadcasting
 *
 * This module provides the broadcast side of the real-time channel: a
 * multi-producer, multi-consumer `tokio::sync::broadcast` channel over
 * which every successful write publishes a change notice.
 *
 * # Delivery Semantics
 *
 * Notices are a signal, not a payload: subscribers follow up with their
 * own `GET /data`. Each subscriber owns an independent receiver, so a slow
 * or dead connection only affects itself. No backlog is replayed to new
 * subscribers.
 */

use tokio::sync::broadcast;

use crate::shared::ChannelMessage;

/// Broadcast sender for change notices.
///
/// Cloned into every handler that needs to publish; `subscribe()` hands
/// each SSE connection its own receiver.
pub type ChangeBroadcast = broadcast::Sender<ChannelMessage>;

/// Publish a change notice to all current subscribers.
///
/// Returns the number of subscribers that received the notice. Zero
/// subscribers is not an error; the write has already been persisted and
/// late clients will catch up on their next pull.
pub fn notify_change(changes: &ChangeBroadcast, notice: ChannelMessage) -> usize {
    let version = notice.version();
    match changes.send(notice) {
        Ok(subscriber_count) => {
            tracing::info!(
                "[Realtime] Change notice v{} sent to {} subscriber(s)",
                version,
                subscriber_count
            );
            subscriber_count
        }
        Err(_) => {
            tracing::debug!("[Realtime] No subscribers for change notice v{}", version);
            0
        }
    }
}
