/**
 * Application State Management
 *
 * `AppState` is the state container handed to the Axum router. It holds
 * the relay hub (presence registry, message store, relay settings), the
 * identity resolver used by the auth middleware and the origin allow-list.
 *
 * # State Extraction
 *
 * The `FromRef` implementations let handlers extract only the part they
 * need, e.g. `State(hub): State<RelayHub>`.
 */

use axum::extract::FromRef;
use std::sync::Arc;

use crate::backend::auth::SharedIdentityResolver;
use crate::backend::realtime::RelayHub;

/// Application state shared by every route
#[derive(Clone)]
pub struct AppState {
    /// Presence, storage and settings for chat sessions
    pub relay: RelayHub,

    /// Resolves upgrade credentials to identities
    pub identity: SharedIdentityResolver,

    /// Browser origins allowed to open a chat connection
    pub cors_origins: Arc<Vec<String>>,
}

impl FromRef<AppState> for RelayHub {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.relay.clone()
    }
}

impl FromRef<AppState> for SharedIdentityResolver {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.identity.clone()
    }
}
