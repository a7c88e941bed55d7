//! Backend Module
//!
//! Server-side code for the ChoreSync synchronization server: a small Axum
//! application that owns the single shared document and fans change
//! notifications out to subscribed clients.
//!
//! # Architecture
//!
//! The backend is organized into focused submodules:
//!
//! - **`server`** - Server initialization, application state, configuration
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`store`** - The document store (atomic, serialized writes)
//! - **`data`** - REST handlers for `GET /data` and `PUT /data`
//! - **`realtime`** - Change broadcasting and the SSE subscription endpoint
//! - **`error`** - Backend-specific error types
//!
//! # State Management
//!
//! All handlers share one `AppState` holding the document store behind
//! `Arc<dyn DocumentStore>` and a `tokio::sync::broadcast` sender for change
//! notices. The store serializes writes internally, which is what gives the
//! version counter its total order; the broadcast channel is the only other
//! shared resource.
//!
//! # Protocol
//!
//! - `GET /data` - current document, always carrying `_version`
//! - `PUT /data` - full-document replace; stamps `_version = stored + 1`,
//!   broadcasts a change notice, returns the stamped document
//! - `GET /events` - SSE stream of `{"type":"data-changed",...}` notices
//! - `GET /version` - build identity probe
//!
//! This module is only compiled when the `server` feature is enabled.

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Document persistence
pub mod store;

/// REST handlers for the shared document
pub mod data;

/// Real-time change notification system
pub mod realtime;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use realtime::{notify_change, ChangeBroadcast};
pub use server::state::AppState;
pub use store::{DocumentStore, FileStore, MemoryStore, StoreError};
