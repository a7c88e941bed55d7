//! ChoreSync - Main Library
//!
//! ChoreSync is the data-synchronization core of a multi-device chore
//! dashboard. A minimal Axum server holds one mutable JSON document and
//! notifies connected clients when it changes; a client-side sync agent
//! gives each device offline-first local storage, background push, and
//! pull-on-notify reconciliation.
//!
//! # Module Structure
//!
//! The library is organized into three main modules:
//!
//! - **`shared`** - Types shared between client and server
//!   - The `Document` blob and its `_version` stamp
//!   - Change-notification channel messages
//!   - Shared error and configuration types
//!
//! - **`backend`** - Server-side code (only compiled with the `server`
//!   feature, which is on by default)
//!   - Document store with atomic, serialized writes
//!   - REST endpoint (`GET /data`, `PUT /data`)
//!   - Broadcast channel and SSE subscription endpoint
//!   - Router, configuration, and the `choresync-server` binary
//!
//! - **`client`** - The sync agent a UI embeds
//!   - Local key-value store (reads and writes never block on the network)
//!   - Event-driven connection state machine
//!   - Background push with a single pending sync intent
//!   - Bounded exponential-backoff reconnection
//!   - Connection health indicator for the UI
//!
//! # Synchronization Model
//!
//! The server enforces a total order on writes: every accepted `PUT /data`
//! stamps `_version = stored + 1`. Conflicts are resolved last-writer-wins;
//! there is no merge and no stale-version rejection. Clients apply local
//! mutations immediately, push the full document in the background, and on a
//! change notification pull the latest document, re-applying any unpushed
//! local state on top before pushing again.
//!
//! # Error Handling
//!
//! - `Result<T, E>` for fallible operations, with layer-specific error enums
//!   in `shared::error`, `backend::error`, and `client::error`
//! - Network failures never propagate to the UI; they surface only through
//!   the connection health indicator while local storage stays authoritative

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "server")]
pub mod backend;

/// Client sync agent
pub mod client;
