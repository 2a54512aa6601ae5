//! Real-time Relay Module
//!
//! Live delivery of direct messages over WebSocket. Each authenticated
//! connection gets a session; sessions find each other through the
//! presence registry.
//!
//! # Architecture
//!
//! - **`presence`** - Identity to live connection map
//! - **`codec`** - Inbound frame decoding, including legacy framing
//! - **`dispatch`** - `send` / `get_history` handlers over the message store
//! - **`session`** - Per-connection state machine
//! - **`socket`** - Axum upgrade handler and socket writer
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs       - Module exports and documentation
//! ├── presence.rs  - PresenceRegistry, ConnectionHandle
//! ├── codec.rs     - Envelope parsing, Request decoding
//! ├── dispatch.rs  - Dispatcher and handler outcomes
//! ├── session.rs   - RelaySession, RelayHub
//! └── socket.rs    - GET /ws/chat
//! ```
//!
//! # Delivery
//!
//! Delivery is best effort: a message is always persisted and
//! acknowledged to its sender, and pushed only if the receiver is
//! connected to this process at that moment.

/// Identity to connection registry
pub mod presence;

/// Wire protocol decoding
pub mod codec;

/// Request handlers
pub mod dispatch;

/// Connection state machine
pub mod session;

/// WebSocket endpoint
pub mod socket;

pub use codec::{decode_frame, CodecError, Request};
pub use dispatch::{Dispatcher, Outcome, Push};
pub use presence::{ConnectionHandle, Directive, PresenceRegistry, PushError};
pub use session::{RelayHub, RelaySession, RelaySettings, SessionState};
pub use socket::ws_chat_handler;
