/**
 * Server Initialization
 *
 * Builds the Axum application from a [`RelayConfig`].
 *
 * # Initialization Process
 *
 * 1. Choose the message store: PostgreSQL when reachable, else in-memory
 * 2. Create the relay hub and identity resolver
 * 3. Create and configure the router
 *
 * # Error Handling
 *
 * A missing or broken database never prevents startup. Migration failures
 * are logged; the relay keeps running against whatever schema exists.
 */

use axum::Router;
use std::sync::Arc;

use crate::backend::auth::JwtIdentityResolver;
use crate::backend::messaging::{InMemoryMessageStore, PgMessageStore, SharedMessageStore};
use crate::backend::realtime::RelayHub;
use crate::backend::routes::create_router;
use crate::backend::server::config::{load_database, RelayConfig};
use crate::backend::server::state::AppState;

/// Create and configure the Axum application
///
/// # Arguments
///
/// * `config` - Loaded relay configuration
///
/// # Returns
///
/// Configured Axum Router ready to serve requests
pub async fn create_app(config: &RelayConfig) -> Router<()> {
    tracing::info!(environment = %config.environment, "Initializing chat relay");
    let store = select_store(config).await;
    create_app_with_store(config, store)
}

/// Build the application around an existing message store
///
/// Used by `create_app` and by tests that need to inspect the store.
pub fn create_app_with_store(config: &RelayConfig, store: SharedMessageStore) -> Router<()> {
    tracing::info!(
        store = store.backend_name(),
        outbound_buffer = config.relay.outbound_buffer,
        close_superseded = config.relay.close_superseded,
        cors_origins = ?config.cors_origins,
        "Relay configured"
    );

    let app_state = AppState {
        relay: RelayHub::new(store, config.relay.clone()),
        identity: Arc::new(JwtIdentityResolver::new(&config.jwt_secret)),
        cors_origins: Arc::new(config.cors_origins.clone()),
    };

    create_router(app_state)
}

async fn select_store(config: &RelayConfig) -> SharedMessageStore {
    let Some(pool) = load_database(config.database_url.as_deref()).await else {
        return Arc::new(InMemoryMessageStore::new());
    };

    let store = PgMessageStore::new(pool);

    tracing::info!("Running database migrations...");
    match store.migrate().await {
        Ok(()) => tracing::info!("Database migrations completed successfully"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to run database migrations");
            tracing::warn!("Continuing without migrations - database might not be up to date");
        }
    }

    Arc::new(store)
}

/// Initialise the global tracing subscriber from `RUST_LOG`
///
/// Defaults to `info` for everything and `debug` for this crate.
pub fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,capsule_relay=debug,tower_http=debug"));

    tracing_subscriber::fmt().with_env_filter(env_filter).init();
}

/// Resolves on Ctrl-C or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl-C handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
