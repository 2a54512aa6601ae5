//! In-memory message store
//!
//! Used when no database is configured and by the test suite. Messages
//! live for the lifetime of the process.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use uuid::Uuid;

use super::store::{MessageStore, StoreError};
use crate::shared::messaging::{Message, MessageKind};

#[derive(Default)]
struct Inner {
    messages: Vec<Message>,
    last_created_at: Option<DateTime<Utc>>,
}

/// Process-local message store backed by a vector
///
/// `created_at` never goes backwards even if the wall clock does, so
/// insertion order and timestamp order always agree.
#[derive(Default)]
pub struct InMemoryMessageStore {
    inner: RwLock<Inner>,
}

impl InMemoryMessageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted messages
    pub fn len(&self) -> usize {
        self.inner.read().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn save(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        kind: MessageKind,
        file_url: Option<&str>,
    ) -> Result<Message, StoreError> {
        let mut inner = self.inner.write();

        let now = Utc::now();
        let created_at = match inner.last_created_at {
            Some(last) if last > now => last,
            _ => now,
        };

        let message = Message {
            id: Uuid::new_v4().to_string(),
            sender_id: sender_id.to_string(),
            receiver_id: receiver_id.to_string(),
            content: content.to_string(),
            kind,
            file_url: file_url.map(str::to_string),
            created_at,
        };

        inner.last_created_at = Some(created_at);
        inner.messages.push(message.clone());
        Ok(message)
    }

    async fn messages_between(&self, a: &str, b: &str) -> Result<Vec<Message>, StoreError> {
        let inner = self.inner.read();
        Ok(inner
            .messages
            .iter()
            .filter(|msg| msg.is_between(a, b))
            .cloned()
            .collect())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_assigns_id_and_timestamp() {
        let store = InMemoryMessageStore::new();
        let a = store
            .save("u1", "u2", "hi", MessageKind::Text, None)
            .await
            .unwrap();
        let b = store
            .save("u1", "u2", "again", MessageKind::Text, None)
            .await
            .unwrap();

        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
        assert!(a.created_at <= b.created_at);
        assert_eq!(store.len(), 2);
    }

    #[tokio::test]
    async fn test_messages_between_filters_pair() {
        let store = InMemoryMessageStore::new();
        store.save("u1", "u2", "1", MessageKind::Text, None).await.unwrap();
        store.save("u2", "u1", "2", MessageKind::Text, None).await.unwrap();
        store.save("u1", "u3", "x", MessageKind::Text, None).await.unwrap();
        store
            .save("u2", "u1", "", MessageKind::Audio, Some("/uploads/a.ogg"))
            .await
            .unwrap();

        let conversation = store.messages_between("u2", "u1").await.unwrap();
        let contents: Vec<_> = conversation.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["1", "2", ""]);
        assert_eq!(conversation[2].file_url.as_deref(), Some("/uploads/a.ogg"));

        assert!(store.messages_between("u3", "u2").await.unwrap().is_empty());
    }
}
