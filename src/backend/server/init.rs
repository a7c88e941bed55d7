/**
 * Server Initialization
 *
 * Builds the complete Axum application from a configuration: file-backed
 * document store, shared state, and the configured router.
 */

use std::sync::Arc;

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::config::ServerConfig;
use crate::backend::server::state::AppState;
use crate::backend::store::FileStore;

/// Create the Axum app for the given configuration
///
/// The returned router is ready to hand to `axum::serve`. Tests that want
/// a different store should build `AppState` themselves and call
/// `create_router` directly.
pub fn create_app(config: &ServerConfig) -> Router<()> {
    tracing::info!(
        "[Server] Document store at {}",
        config.data_path.display()
    );
    if let Some(dir) = &config.static_dir {
        tracing::info!("[Server] Serving static files from {}", dir.display());
    }

    let store = Arc::new(FileStore::new(config.data_path.clone()));
    let state = AppState::new(store);
    create_router(state, config.static_dir.as_deref())
}
