//! # Connection Health Indicator
//!
//! Derived connection state exposed to the UI. The indicator is the only
//! place transient network failures are allowed to surface; they never
//! appear as errors on the read or write path.

use serde::{Deserialize, Serialize};

/// Whether the agent currently holds a live server connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConnectionHealth {
    /// Broadcast channel is live; pushes and pulls are flowing
    Connected,
    /// No live connection: offline, reconnecting, or no server configured
    Disconnected,
}

impl ConnectionHealth {
    /// True when the agent holds a live connection
    pub fn is_connected(&self) -> bool {
        matches!(self, Self::Connected)
    }
}

impl Default for ConnectionHealth {
    fn default() -> Self {
        Self::Disconnected
    }
}
