/**
 * Capsule Relay Server Entry Point
 *
 * Loads configuration, builds the Axum app and serves the chat relay
 * until Ctrl-C or SIGTERM.
 */

use capsule_relay::backend::server::{create_app, init, RelayConfig};
use capsule_relay::backend::BackendError;

#[tokio::main]
async fn main() -> Result<(), BackendError> {
    // Load environment variables from .env file if present
    dotenv::dotenv().ok();

    init::init_tracing();

    let config = RelayConfig::from_env().map_err(|e| {
        tracing::error!(error = %e, "Invalid configuration");
        e
    })?;

    let app = create_app(&config).await;

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Chat relay listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(init::shutdown_signal())
        .await?;

    tracing::info!("Chat relay stopped");
    Ok(())
}
