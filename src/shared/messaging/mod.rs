//! Messaging Module
//!
//! Data structures for the direct-message relay:
//!
//! - `Message` - A persisted message between two identities
//! - `SendPayload` / `HistoryQuery` - Inbound request payloads
//! - `Outbound` - Frames written back to clients
//!
//! # Usage
//!
//! ```rust
//! use capsule_relay::shared::messaging::{Message, MessageKind, Outbound};
//! ```

pub mod message;
pub mod protocol;

// Re-export all types
pub use message::{Identity, Message, MessageKind};
pub use protocol::{ErrorPayload, HistoryPage, HistoryQuery, Outbound, SendPayload};
