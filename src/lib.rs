//! Capsule Relay - Main Library
//!
//! A real-time direct-message relay. Authenticated clients hold a
//! WebSocket connection; messages they send are persisted, acknowledged
//! and pushed live to the receiver if the receiver is connected.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire types shared with clients
//!   - `Message`, `MessageKind`
//!   - Inbound payloads and outbound frames
//!   - Error types
//!
//! - **`backend`** - The relay server
//!   - Axum HTTP server and WebSocket upgrade
//!   - Presence registry and relay sessions
//!   - Message stores (PostgreSQL, in-memory)
//!   - JWT identity resolution
//!
//! # Usage
//!
//! ```rust,no_run
//! use capsule_relay::backend::server::{create_app, RelayConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = RelayConfig::from_env()?;
//! let app = create_app(&config).await;
//! let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Wire Protocol
//!
//! Inbound frames are JSON envelopes:
//!
//! ```json
//! {"type": "send", "payload": {"receiver_id": "u2", "content": "hi", "type": "text"}}
//! {"type": "get_history", "payload": {"user_id": "u2", "page": 1, "limit": 20}}
//! ```
//!
//! Outbound frames use the same shape with `type` one of `message`,
//! `history` or `error`.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
pub mod backend;
