/**
 * Presence Registry
 *
 * Tracks which identities currently have a live chat connection and how to
 * reach it. This is the single source of truth for "is this user online".
 *
 * # Invariants
 *
 * - At most one handle per identity; registering again replaces the entry
 *   (last write wins) and hands the replaced handle back to the caller
 * - `unregister` only removes the entry if it still belongs to the caller's
 *   connection, so a stale session can never evict its replacement
 *
 * # Locking
 *
 * All operations are plain map operations under one mutex. Nothing in this
 * module performs I/O while the lock is held; writes to a connection happen
 * on the handle after it has been looked up.
 */

use parking_lot::Mutex;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::shared::messaging::{Identity, Outbound};

/// Instruction for a connection's writer task
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    /// Serialize and write a frame
    Frame(Outbound),
    /// Flush, send a close frame and stop writing
    Close,
}

/// Why a frame could not be handed to a connection
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PushError {
    /// The connection's writer has gone away
    #[error("connection closed")]
    Closed,
    /// The connection is not draining its queue fast enough
    #[error("outbound queue full")]
    Full,
}

/// Write-side handle onto one live connection
///
/// Every session creates exactly one handle with a fresh id. Clones share
/// that id, which is what the registry compares on `unregister`. Once the
/// session's writer task ends, every write through the handle fails.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: Uuid,
    tx: mpsc::Sender<Directive>,
}

impl ConnectionHandle {
    /// Create a handle and the queue its writer task drains
    pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<Directive>) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (
            Self {
                id: Uuid::new_v4(),
                tx,
            },
            rx,
        )
    }

    /// Connection id, unique per session
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Whether both handles point at the same connection
    pub fn same_connection(&self, other: &ConnectionHandle) -> bool {
        self.id == other.id
    }

    /// Whether the writer side is gone
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Queue a frame, waiting for room
    ///
    /// Used by a session for its own replies so they are never dropped.
    pub async fn deliver(&self, frame: Outbound) -> Result<(), PushError> {
        self.tx
            .send(Directive::Frame(frame))
            .await
            .map_err(|_| PushError::Closed)
    }

    /// Queue a frame without waiting
    ///
    /// Used for pushes to other sessions; a slow peer never blocks the caller.
    pub fn push(&self, frame: Outbound) -> Result<(), PushError> {
        self.tx
            .try_send(Directive::Frame(frame))
            .map_err(|err| match err {
                mpsc::error::TrySendError::Full(_) => PushError::Full,
                mpsc::error::TrySendError::Closed(_) => PushError::Closed,
            })
    }

    /// Ask the writer to close the connection
    pub fn close(&self) -> Result<(), PushError> {
        self.tx.try_send(Directive::Close).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => PushError::Full,
            mpsc::error::TrySendError::Closed(_) => PushError::Closed,
        })
    }
}

/// Identity -> live connection map
#[derive(Debug, Default)]
pub struct PresenceRegistry {
    entries: Mutex<HashMap<Identity, ConnectionHandle>>,
}

impl PresenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install `handle` for `identity`
    ///
    /// Returns the handle that was replaced, if any. The replaced connection
    /// is NOT closed here; closing it is the caller's decision.
    pub fn register(&self, identity: &str, handle: ConnectionHandle) -> Option<ConnectionHandle> {
        self.entries.lock().insert(identity.to_string(), handle)
    }

    /// Current handle for `identity`
    pub fn lookup(&self, identity: &str) -> Option<ConnectionHandle> {
        self.entries.lock().get(identity).cloned()
    }

    /// Remove `identity` if it is still registered to `handle`'s connection
    ///
    /// Returns whether an entry was removed.
    pub fn unregister(&self, identity: &str, handle: &ConnectionHandle) -> bool {
        let mut entries = self.entries.lock();
        match entries.get(identity) {
            Some(current) if current.same_connection(handle) => {
                entries.remove(identity);
                true
            }
            _ => false,
        }
    }

    /// Whether `identity` currently has a live entry
    pub fn is_online(&self, identity: &str) -> bool {
        self.entries.lock().contains_key(identity)
    }

    /// Number of identities online
    pub fn online_count(&self) -> usize {
        self.entries.lock().len()
    }
}
