/**
 * Change Notification Messages
 *
 * This module defines the messages carried by the real-time channel from
 * the server to subscribed clients. Notifications are a signal only: they
 * never carry the document itself. A client that receives one is expected
 * to follow up with its own `GET /data`.
 */
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Header a writer sends on PUT to identify itself as the change origin
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Header a subscriber sends to initiate the change subscription
pub const SUBSCRIBE_HEADER: &str = "subscribe";

/// A message on the server-to-client change channel.
///
/// Wire format: `{"type":"data-changed","version":7,"origin":"<uuid>"}`.
/// `origin` is the id the writing client sent with its PUT, if any; the
/// subscription endpoint uses it to skip echoing a change back to its
/// originator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChannelMessage {
    /// The shared document was replaced by a successful write
    DataChanged {
        /// The version stamped on the new document
        version: u64,
        /// Id of the client whose PUT caused the change, when known
        #[serde(default, skip_serializing_if = "Option::is_none")]
        origin: Option<Uuid>,
    },
}

impl ChannelMessage {
    /// Create a data-changed notice
    pub fn data_changed(version: u64, origin: Option<Uuid>) -> Self {
        Self::DataChanged { version, origin }
    }

    /// The version carried by this message
    pub fn version(&self) -> u64 {
        match self {
            Self::DataChanged { version, .. } => *version,
        }
    }

    /// The originating client id, if the writer identified itself
    pub fn origin(&self) -> Option<Uuid> {
        match self {
            Self::DataChanged { origin, .. } => *origin,
        }
    }

    /// Event name used on the SSE stream
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::DataChanged { .. } => "data-changed",
        }
    }
}
