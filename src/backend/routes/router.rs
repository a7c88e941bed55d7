/**
 * Router Configuration
 *
 * This module assembles the Axum router for the sync server.
 *
 * # Route Order
 *
 * 1. Document routes (`/data` GET+PUT)
 * 2. Change subscription (`/events`)
 * 3. Version probe (`/version`)
 * 4. Static file fallback (when a static directory is configured),
 *    otherwise a plain 404 fallback
 *
 * Sync routes are registered before the static fallback so the protocol
 * endpoints always take precedence over files of the same name.
 */

use std::path::Path;

use axum::{http::StatusCode, routing::get, Router};
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;

use crate::backend::data::handlers::{handle_get_data, handle_put_data, handle_version};
use crate::backend::realtime::subscription::handle_events_subscription;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - shared state (document store + change broadcast)
/// * `static_dir` - optional directory served for any path the sync
///   protocol does not claim; `index.html` is served for directory
///   requests so a browser can just visit the server root
pub fn create_router(app_state: AppState, static_dir: Option<&Path>) -> Router<()> {
    let router = Router::new()
        .route("/data", get(handle_get_data).put(handle_put_data))
        .route("/events", get(handle_events_subscription))
        .route("/version", get(handle_version));

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(handle_not_found),
    };

    // Browser clients may be served from a different origin than the one
    // they sync against (e.g. a dev server), so the API stays permissive.
    let router = router.layer(CorsLayer::permissive());

    router.with_state(app_state)
}

async fn handle_not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "not found\n")
}
