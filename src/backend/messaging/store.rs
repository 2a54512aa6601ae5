/**
 * Message Store Contract
 *
 * The relay persists every message through this trait and never touches
 * storage internals directly. Implementations must be safe to call from
 * many sessions at once.
 *
 * # Contract
 *
 * - `save` assigns the message id and `created_at`; callers never supply them
 * - `messages_between` returns the whole conversation between two identities,
 *   oldest first, regardless of who sent each message
 */

use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

use crate::shared::messaging::{Message, MessageKind};

/// Errors raised by a message store
#[derive(Debug, Error)]
pub enum StoreError {
    /// The database rejected the query or the connection failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Schema migrations could not be applied
    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The store cannot serve requests at the moment
    #[error("Message store unavailable: {0}")]
    Unavailable(String),
}

/// Durable, append-only persistence of messages
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message and return the stored record
    async fn save(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        kind: MessageKind,
        file_url: Option<&str>,
    ) -> Result<Message, StoreError>;

    /// All messages exchanged between `a` and `b`, ascending by creation time
    async fn messages_between(&self, a: &str, b: &str) -> Result<Vec<Message>, StoreError>;

    /// Short name reported by the health endpoint
    fn backend_name(&self) -> &'static str;
}

/// Store handle shared by every session
pub type SharedMessageStore = Arc<dyn MessageStore>;
