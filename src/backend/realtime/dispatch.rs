/**
 * Relay Dispatch Handlers
 *
 * Maps a decoded request from an identity to its effects:
 * a store operation, the reply for the sender and, for `send`, the
 * identity that should receive a live push. Handlers never touch a
 * connection; the session carries out the outcome.
 *
 * # Handlers
 *
 * - `send` - persist, reply with the stored record, push it to the receiver
 * - `get_history` - page through the conversation with another identity
 * - anything else - `error` frame naming the type
 *
 * # Failures
 *
 * Validation and store failures become `error` replies. A failed `send`
 * never yields a push.
 */

use crate::backend::messaging::SharedMessageStore;
use crate::backend::realtime::codec::Request;
use crate::shared::messaging::{HistoryPage, HistoryQuery, Identity, Outbound, SendPayload};

/// A live delivery the session should attempt after replying
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Push {
    /// Identity to look up in the presence registry
    pub to: Identity,
    /// Frame to hand to that identity's connection
    pub frame: Outbound,
}

/// Result of handling one request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Frame written back to the sender
    pub reply: Outbound,
    /// Optional push to a second identity
    pub push: Option<Push>,
}

impl Outcome {
    fn reply(reply: Outbound) -> Self {
        Self { reply, push: None }
    }

    fn error(message: impl Into<String>) -> Self {
        Self::reply(Outbound::error(message))
    }
}

/// Routes decoded requests to their handlers
#[derive(Clone)]
pub struct Dispatcher {
    store: SharedMessageStore,
}

impl Dispatcher {
    pub fn new(store: SharedMessageStore) -> Self {
        Self { store }
    }

    /// Handle one request from `sender`
    pub async fn dispatch(&self, sender: &str, request: Request) -> Outcome {
        match request {
            Request::Send(payload) => self.handle_send(sender, payload).await,
            Request::GetHistory(query) => self.handle_get_history(sender, query).await,
            Request::Unknown(kind) => {
                tracing::warn!(user_id = %sender, message_type = %kind, "Unknown message type");
                Outcome::error(format!("unknown message type: {}", kind))
            }
        }
    }

    /// Persist a message and address a push to its receiver
    pub async fn handle_send(&self, sender: &str, payload: SendPayload) -> Outcome {
        if let Err(e) = payload.validate() {
            return Outcome::error(e.detail());
        }

        let saved = match self
            .store
            .save(
                sender,
                &payload.receiver_id,
                &payload.content,
                payload.kind,
                payload.attachment(),
            )
            .await
        {
            Ok(message) => message,
            Err(e) => {
                tracing::error!(user_id = %sender, error = %e, "Chat save error");
                return Outcome::error("failed to save message");
            }
        };

        tracing::debug!(
            user_id = %sender,
            receiver_id = %saved.receiver_id,
            message_id = %saved.id,
            "Message persisted"
        );

        // A note to self is already delivered by the receipt
        let push = (saved.receiver_id != sender).then(|| Push {
            to: saved.receiver_id.clone(),
            frame: Outbound::Message(saved.clone()),
        });

        Outcome {
            reply: Outbound::Message(saved),
            push,
        }
    }

    /// Serve one page of the conversation between `requester` and `query.user_id`
    pub async fn handle_get_history(&self, requester: &str, query: HistoryQuery) -> Outcome {
        if let Err(e) = query.validate() {
            return Outcome::error(e.detail());
        }

        let page = query.effective_page();
        let limit = query.effective_limit();

        let messages = match self.store.messages_between(requester, &query.user_id).await {
            Ok(messages) => messages,
            Err(e) => {
                tracing::error!(user_id = %requester, error = %e, "Chat history error");
                return Outcome::error("failed to fetch history");
            }
        };

        let (data, total) = paginate(messages, page, limit);
        Outcome::reply(Outbound::History(HistoryPage {
            data,
            page,
            limit,
            total,
        }))
    }
}

/// Slice one 1-based page out of `items`, returning it with the full length
pub fn paginate<T>(items: Vec<T>, page: u32, limit: u32) -> (Vec<T>, usize) {
    let total = items.len();
    let start = (page.max(1) as usize - 1).saturating_mul(limit as usize);
    if start >= total {
        return (Vec::new(), total);
    }
    let page = items.into_iter().skip(start).take(limit as usize).collect();
    (page, total)
}
