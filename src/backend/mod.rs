//! Backend Module
//!
//! Server-side code of the chat relay: an Axum HTTP server that upgrades
//! authenticated clients to WebSocket chat sessions and relays direct
//! messages between them.
//!
//! # Architecture
//!
//! - **`server`** - Configuration, application state, startup
//! - **`routes`** - Router assembly and the health endpoint
//! - **`realtime`** - Presence, wire codec, dispatch and sessions
//! - **`messaging`** - Message store contract and implementations
//! - **`auth`** - Credential to identity resolution
//! - **`middleware`** - Auth and origin checks on the upgrade
//! - **`error`** - HTTP-facing error type
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - Server binary
//! ├── server/         - Config, state, init
//! ├── routes/         - Router, health
//! ├── realtime/       - Chat relay core
//! ├── messaging/      - Message stores
//! ├── auth/           - Identity resolution
//! ├── middleware/     - Request middleware
//! └── error/          - Error types
//! ```
//!
//! # Request Flow
//!
//! ```text
//! GET /ws/chat -> auth_middleware -> ws_chat_handler -> upgrade
//!   -> RelaySession (read loop) + writer task (outbound queue)
//!   -> Dispatcher -> MessageStore
//!   -> PresenceRegistry lookup -> push to receiver's queue
//! ```
//!
//! # Thread Safety
//!
//! - `PresenceRegistry` uses one `parking_lot::Mutex` and never does I/O under it
//! - Message stores synchronize internally (`RwLock` or the connection pool)
//! - Each connection's outbound frames go through a bounded `mpsc` queue

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Real-time chat relay
pub mod realtime;

/// Message persistence
pub mod messaging;

/// Identity resolution
pub mod auth;

/// Middleware for request processing
pub mod middleware;

/// Backend error types
pub mod error;

/// Re-export commonly used types
pub use error::BackendError;
pub use server::{create_app, RelayConfig};
