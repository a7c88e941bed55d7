//! Real-time change notification system
//!
//! Fans out `data-changed` notices to every subscribed client over
//! Server-Sent Events, backed by a `tokio::sync::broadcast` channel.

pub mod broadcast;
pub mod subscription;

pub use broadcast::{notify_change, ChangeBroadcast};
pub use subscription::handle_events_subscription;
