//! Relay Wire Protocol
//!
//! Payload shapes carried inside the `{type, payload}` envelope of the
//! chat WebSocket. Inbound payloads are decoded by the relay codec;
//! outbound frames are serialized from [`Outbound`].
//!
//! Note that `type` is overloaded on the wire: at the envelope level it
//! selects the handler, inside a `send` payload it is the message's
//! [`MessageKind`].

use serde::{Deserialize, Serialize};

use super::message::{Identity, Message, MessageKind};
use crate::shared::error::SharedError;

/// Payload of a `send` request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SendPayload {
    /// Who the message is for
    pub receiver_id: Identity,
    /// Message body
    #[serde(default)]
    pub content: String,
    /// Content type of the message
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Attachment location
    #[serde(default)]
    pub file_url: Option<String>,
}

impl SendPayload {
    /// Check required fields
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.receiver_id.trim().is_empty() {
            return Err(SharedError::validation("receiver_id", "receiver_id required"));
        }
        Ok(())
    }

    /// Attachment URL with empty strings treated as absent
    pub fn attachment(&self) -> Option<&str> {
        self.file_url.as_deref().filter(|url| !url.is_empty())
    }
}

/// Payload of a `get_history` request
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryQuery {
    /// The other participant of the conversation
    #[serde(default)]
    pub user_id: Identity,
    /// 1-based page number
    #[serde(default)]
    pub page: i64,
    /// Page size
    #[serde(default)]
    pub limit: i64,
}

impl HistoryQuery {
    pub const DEFAULT_PAGE: u32 = 1;
    pub const DEFAULT_LIMIT: u32 = 20;
    pub const MAX_LIMIT: u32 = 100;

    /// Check required fields
    pub fn validate(&self) -> Result<(), SharedError> {
        if self.user_id.trim().is_empty() {
            return Err(SharedError::validation("user_id", "user_id required"));
        }
        Ok(())
    }

    /// Page number after defaults: anything below 1 becomes 1
    pub fn effective_page(&self) -> u32 {
        if self.page < 1 {
            Self::DEFAULT_PAGE
        } else {
            u32::try_from(self.page).unwrap_or(u32::MAX)
        }
    }

    /// Page size after defaults: anything outside `1..=100` becomes 20
    pub fn effective_limit(&self) -> u32 {
        if (1..=i64::from(Self::MAX_LIMIT)).contains(&self.limit) {
            self.limit as u32
        } else {
            Self::DEFAULT_LIMIT
        }
    }
}

/// One page of a conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryPage {
    /// Messages on this page, oldest first
    pub data: Vec<Message>,
    /// Page number that was served
    pub page: u32,
    /// Page size that was applied
    pub limit: u32,
    /// Size of the whole conversation
    pub total: usize,
}

/// Payload of an `error` frame
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorPayload {
    pub message: String,
}

/// Frame written from the relay to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Outbound {
    /// A persisted message: the sender's receipt or a live push
    Message(Message),
    /// Response to `get_history`
    History(HistoryPage),
    /// Recoverable protocol or handler error
    Error(ErrorPayload),
}

impl Outbound {
    /// Build an `error` frame
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(ErrorPayload {
            message: message.into(),
        })
    }

    /// Envelope type name of this frame
    pub fn kind(&self) -> &'static str {
        match self {
            Outbound::Message(_) => "message",
            Outbound::History(_) => "history",
            Outbound::Error(_) => "error",
        }
    }

    /// Serialize to the JSON text sent over the socket
    pub fn encode(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }
}
