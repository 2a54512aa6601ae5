//! Shared Module
//!
//! Types shared between the relay and its clients. Everything here is
//! plain data designed for JSON serialization over the chat WebSocket.

/// Shared error types
pub mod error;

/// Messaging types and the relay wire protocol
pub mod messaging;

/// Re-export commonly used types for convenience
pub use error::SharedError;
pub use messaging::{Identity, Message, MessageKind, Outbound};
