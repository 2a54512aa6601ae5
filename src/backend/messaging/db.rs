//! Database operations for messaging
//!
//! PostgreSQL implementation of the message store.

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use parking_lot::Mutex;
use sqlx::{postgres::PgRow, PgPool, Row};
use std::sync::Arc;
use uuid::Uuid;

use super::store::{MessageStore, StoreError};
use crate::shared::messaging::{Message, MessageKind};

/// Message store backed by the `messages` table
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
    last_created_at: Arc<Mutex<Option<DateTime<Utc>>>>,
}

impl PgMessageStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            last_created_at: Arc::new(Mutex::new(None)),
        }
    }

    /// Next `created_at`, never earlier than one this store already handed out
    fn next_created_at(&self) -> DateTime<Utc> {
        let now = self.next_created_at();
        let mut last = self.last_created_at.lock();
        let created_at = match *last {
            Some(previous) if previous > now => previous,
            _ => now,
        };
        *last = Some(created_at);
        created_at
    }

    /// Apply the bundled migrations
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!().run(&self.pool).await?;
        Ok(())
    }
}

fn message_from_row(row: &PgRow) -> Result<Message, sqlx::Error> {
    let kind: String = row.try_get("message_type")?;
    let kind = MessageKind::parse(&kind).unwrap_or_else(|| {
        tracing::warn!(message_type = %kind, "Unknown message type in database, reading as text");
        MessageKind::Text
    });

    Ok(Message {
        id: row.try_get("id")?,
        sender_id: row.try_get("sender_id")?,
        receiver_id: row.try_get("receiver_id")?,
        content: row.try_get("content")?,
        kind,
        file_url: row.try_get("file_url")?,
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MessageStore for PgMessageStore {
    async fn save(
        &self,
        sender_id: &str,
        receiver_id: &str,
        content: &str,
        kind: MessageKind,
        file_url: Option<&str>,
    ) -> Result<Message, StoreError> {
        let id = Uuid::new_v4().to_string();
        let now = self.next_created_at();

        let row = sqlx::query(
            r#"
            INSERT INTO messages (id, sender_id, receiver_id, content, message_type, file_url, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING id, sender_id, receiver_id, content, message_type, file_url, created_at
            "#
        )
        .bind(&id)
        .bind(sender_id)
        .bind(receiver_id)
        .bind(content)
        .bind(kind.as_str())
        .bind(file_url)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(message_from_row(&row)?)
    }

    async fn messages_between(&self, a: &str, b: &str) -> Result<Vec<Message>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT id, sender_id, receiver_id, content, message_type, file_url, created_at
            FROM messages
            WHERE (sender_id = $1 AND receiver_id = $2)
               OR (sender_id = $2 AND receiver_id = $1)
            ORDER BY created_at ASC, seq ASC
            "#
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        let messages = rows
            .iter()
            .map(message_from_row)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(messages)
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}
