//! Chat Message Data Structure
//!
//! Represents a persisted direct message between two identities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque identifier of an authenticated principal
///
/// Supplied by the identity layer (the `user_id` claim of a token);
/// the relay never generates one.
pub type Identity = String;

/// Type of message content
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    /// Plain text message
    #[default]
    Text,
    /// Image message, `file_url` points at the upload
    Image,
    /// Voice or audio clip
    Audio,
    /// Generic file attachment
    File,
}

impl MessageKind {
    /// All content types, in wire order
    pub const ALL: [MessageKind; 4] = [
        MessageKind::Text,
        MessageKind::Image,
        MessageKind::Audio,
        MessageKind::File,
    ];

    /// Wire and database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageKind::Text => "text",
            MessageKind::Image => "image",
            MessageKind::Audio => "audio",
            MessageKind::File => "file",
        }
    }

    /// Parse from the wire/database representation
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Represents a persisted chat message
///
/// Created exactly once by a message store; `id` and `created_at` are
/// always server-assigned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    /// Unique message ID (UUID v4)
    pub id: String,
    /// Identity that sent the message
    pub sender_id: Identity,
    /// Identity the message is addressed to
    pub receiver_id: Identity,
    /// Message body; may be empty for attachments
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
    /// Content type
    #[serde(rename = "type", default)]
    pub kind: MessageKind,
    /// Location of the attachment, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    /// When the store persisted the message
    pub created_at: DateTime<Utc>,
}

impl Message {
    /// Whether the message belongs to the conversation between `a` and `b`
    pub fn is_between(&self, a: &str, b: &str) -> bool {
        (self.sender_id == a && self.receiver_id == b)
            || (self.sender_id == b && self.receiver_id == a)
    }
}
