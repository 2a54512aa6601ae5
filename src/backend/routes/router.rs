/**
 * Router Configuration
 *
 * Assembles the relay's HTTP surface into a single Axum router.
 *
 * # Routes
 *
 * - `GET /health` - Liveness and presence count, no auth
 * - `GET /ws/chat` - Chat WebSocket upgrade, behind `auth_middleware`
 *
 * The auth middleware is a route layer on the chat route only, so unknown
 * paths still fall through to the 404 handler instead of answering 401.
 */

use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::backend::error::BackendError;
use crate::backend::middleware::auth_middleware;
use crate::backend::realtime::ws_chat_handler;
use crate::backend::routes::health::health_handler;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Relay hub, identity resolver and origin allow-list
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub fn create_router(app_state: AppState) -> Router<()> {
    let chat_routes = Router::new()
        .route("/ws/chat", get(ws_chat_handler))
        .route_layer(middleware::from_fn_with_state(
            app_state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health_handler))
        .merge(chat_routes)
        .fallback(|| async {
            BackendError::handler(axum::http::StatusCode::NOT_FOUND, "not found")
        })
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
