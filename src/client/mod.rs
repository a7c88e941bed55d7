//! # Client Sync Agent
//!
//! The client half of the sync protocol, embedded by a UI. It owns:
//!
//! - **Local-first storage**: every read and write goes to the local store
//!   immediately; the network is never on the UI's critical path
//! - **Background push**: local mutations become a single pending sync
//!   intent that is pushed as the full document and retried until
//!   acknowledged, never silently dropped
//! - **Pull-on-notify**: change notices from the server trigger a pull and
//!   a merge-by-replacement that preserves unpushed local edits
//! - **Reconnection**: transient failures move the agent to Disconnected
//!   and schedule bounded exponential-backoff retries
//! - **Health indicator**: a watch channel the UI can observe; transient
//!   failures surface there and nowhere else
//!
//! ## Structure
//!
//! - `agent` - pure, I/O-free connection state machine
//! - `background` - the driver task that performs the I/O the state
//!   machine decides on, plus the handle a UI holds
//! - `transport` - reqwest-based GET/PUT and SSE subscription
//! - `local` - file-backed key-value store for the document
//! - `reconcile` - remote/local merge rules
//! - `intent`, `backoff`, `health`, `config`, `error` - supporting types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use choresync::client::{self, ClientConfig};
//!
//! # async fn example() -> Result<(), choresync::client::ClientError> {
//! let handle = client::start(ClientConfig::load())?;
//!
//! // Mutations apply locally at once and sync in the background
//! handle.mutate(|doc| {
//!     doc.fields.insert("users".into(), serde_json::json!(["Alice"]));
//! })?;
//!
//! // The UI renders the health indicator from here
//! let health = handle.health();
//! # let _ = health;
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod backoff;
pub mod background;
pub mod config;
pub mod error;
pub mod health;
pub mod intent;
pub mod local;
pub mod reconcile;
pub mod transport;

pub use agent::{ConnectionState, SyncAgent, SyncCommand, SyncEvent};
pub use background::{SyncDriver, SyncHandle};
pub use config::ClientConfig;
pub use error::ClientError;
pub use health::ConnectionHealth;
pub use intent::SyncIntent;
pub use local::LocalStore;
pub use transport::HttpTransport;

/// Start the sync agent for the given configuration.
///
/// Opens the local store, builds the transport when a server is
/// configured, and spawns the background driver on the current tokio
/// runtime. The returned handle is the UI's only interface: local reads
/// and writes, manual reconnect, and the health indicator.
pub fn start(config: ClientConfig) -> Result<SyncHandle, ClientError> {
    let local = LocalStore::open(config.data_path())?;
    let transport = match config.server_url() {
        Some(url) => Some(HttpTransport::new(
            url,
            config.request_timeout(),
            config.connect_timeout(),
        )?),
        None => None,
    };

    let (handle, driver) = SyncDriver::new(local, transport, config.backoff());
    tokio::spawn(driver.run());
    Ok(handle)
}
