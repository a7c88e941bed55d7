/**
 * Application State Management
 *
 * This module defines the application state structure and implements the
 * `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * `AppState` is the central state container:
 * - the document store, behind `Arc<dyn DocumentStore>` so tests can
 *   inject a double
 * - the broadcast sender for change notices
 *
 * The store serializes its own writes; the broadcast sender is inherently
 * thread-safe. Nothing else is shared between handlers.
 */

use std::sync::Arc;

use axum::extract::FromRef;
use tokio::sync::broadcast;

use crate::backend::realtime::broadcast::ChangeBroadcast;
use crate::backend::store::DocumentStore;
use crate::shared::ChannelMessage;

/// Shared handle to the document store
pub type SharedStore = Arc<dyn DocumentStore>;

/// Capacity of the change-notice channel.
///
/// A lagging subscriber loses old notices, which is harmless: notices are
/// signals and the client converges on its next pull.
const CHANGE_CHANNEL_CAPACITY: usize = 128;

/// Application state shared by all handlers
#[derive(Clone)]
pub struct AppState {
    /// The document store owning the authoritative `_version` counter
    pub store: SharedStore,

    /// Broadcast channel feeding every `/events` subscription
    pub changes: ChangeBroadcast,
}

impl AppState {
    /// Create state around a store, with a fresh change channel
    pub fn new(store: SharedStore) -> Self {
        let (changes, _) = broadcast::channel::<ChannelMessage>(CHANGE_CHANNEL_CAPACITY);
        Self { store, changes }
    }
}

/// Allow handlers to extract the store directly
impl FromRef<AppState> for SharedStore {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.store.clone()
    }
}

/// Allow handlers to extract the change broadcast sender directly
impl FromRef<AppState> for ChangeBroadcast {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.changes.clone()
    }
}
