/**
 * Relay Session
 *
 * One `RelaySession` exists per accepted chat connection. It owns the
 * identity resolved before the upgrade, the connection's write handle and
 * the read side of the socket.
 *
 * # Lifecycle
 *
 * ```text
 * Connecting --activate--> Active --close/error/fatal frame--> Closed
 * ```
 *
 * Entering `Active` installs the connection in the presence registry. The
 * returned [`PresenceGuard`] removes it again when dropped, which covers
 * normal exit, early return and the task being cancelled.
 *
 * # Ordering
 *
 * Frames are read, decoded, dispatched and answered one at a time. The reply
 * for frame N is queued before frame N+1 is read, and the connection's writer
 * drains its queue in order, so replies leave in request order.
 */

use futures_util::{Stream, StreamExt};
use std::fmt::Display;
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use axum::extract::ws::Message as WsMessage;

use crate::backend::messaging::SharedMessageStore;
use crate::backend::realtime::codec;
use crate::backend::realtime::dispatch::{Dispatcher, Push};
use crate::backend::realtime::presence::{ConnectionHandle, Directive, PresenceRegistry};
use crate::shared::messaging::{Identity, Outbound};

/// Error text sent to a connection replaced by a newer one for the same identity
pub const SUPERSEDED_MESSAGE: &str = "session superseded by a newer connection";

/// Tunables shared by every session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelaySettings {
    /// Capacity of each connection's outbound queue
    pub outbound_buffer: usize,
    /// Close the previous connection when an identity reconnects
    pub close_superseded: bool,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            outbound_buffer: 64,
            close_superseded: true,
        }
    }
}

/// Everything a session needs from the process: presence, storage, settings
#[derive(Clone)]
pub struct RelayHub {
    presence: Arc<PresenceRegistry>,
    store: SharedMessageStore,
    dispatcher: Dispatcher,
    settings: RelaySettings,
}

impl RelayHub {
    pub fn new(store: SharedMessageStore, settings: RelaySettings) -> Self {
        Self {
            presence: Arc::new(PresenceRegistry::new()),
            dispatcher: Dispatcher::new(store.clone()),
            store,
            settings,
        }
    }

    pub fn presence(&self) -> &Arc<PresenceRegistry> {
        &self.presence
    }

    pub fn settings(&self) -> &RelaySettings {
        &self.settings
    }

    /// Name of the configured message store backend
    pub fn store_backend(&self) -> &'static str {
        self.store.backend_name()
    }
}

/// Lifecycle state of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Identity resolved, not yet visible to other sessions
    Connecting,
    /// Registered and reading frames
    Active,
    /// Unregistered; no further reads or writes
    Closed,
}

/// Removes a session's presence entry when dropped
///
/// Removal compares connection ids, so a guard belonging to a superseded
/// session leaves the newer registration in place.
pub struct PresenceGuard {
    presence: Arc<PresenceRegistry>,
    identity: Identity,
    handle: ConnectionHandle,
}

impl Drop for PresenceGuard {
    fn drop(&mut self) {
        let removed = self.presence.unregister(&self.identity, &self.handle);
        tracing::debug!(
            user_id = %self.identity,
            conn_id = %self.handle.id(),
            removed,
            event = "unregister",
            "Presence released"
        );
    }
}

/// Per-connection protocol state machine
pub struct RelaySession {
    identity: Identity,
    handle: ConnectionHandle,
    hub: RelayHub,
    state: SessionState,
}

impl RelaySession {
    /// Create a session for an authenticated identity
    ///
    /// Returns the session and the outbound queue the connection's writer
    /// task must drain.
    pub fn connect(identity: impl Into<Identity>, hub: RelayHub) -> (Self, mpsc::Receiver<Directive>) {
        let (handle, outbound) = ConnectionHandle::channel(hub.settings.outbound_buffer);
        let session = Self {
            identity: identity.into(),
            handle,
            hub,
            state: SessionState::Connecting,
        };
        (session, outbound)
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn conn_id(&self) -> Uuid {
        self.handle.id()
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Register this connection as the identity's live connection
    ///
    /// A previously registered connection for the same identity is told it
    /// was superseded and asked to close, unless that is disabled in the
    /// relay settings.
    pub fn activate(&mut self) -> PresenceGuard {
        let replaced = self
            .hub
            .presence
            .register(&self.identity, self.handle.clone());

        if let Some(previous) = replaced {
            tracing::info!(
                user_id = %self.identity,
                conn_id = %self.handle.id(),
                replaced_conn_id = %previous.id(),
                event = "supersede",
                "Identity reconnected, replacing previous connection"
            );
            if self.hub.settings.close_superseded {
                if let Err(e) = previous
                    .push(Outbound::error(SUPERSEDED_MESSAGE))
                    .and_then(|_| previous.close())
                {
                    tracing::debug!(
                        replaced_conn_id = %previous.id(),
                        error = %e,
                        "Could not notify superseded connection"
                    );
                }
            }
        }

        self.state = SessionState::Active;
        tracing::info!(
            user_id = %self.identity,
            conn_id = %self.handle.id(),
            event = "connect",
            "Chat session active"
        );

        PresenceGuard {
            presence: Arc::clone(&self.hub.presence),
            identity: self.identity.clone(),
            handle: self.handle.clone(),
        }
    }

    /// Drive the session until the inbound side ends
    ///
    /// Registers presence on entry and always unregisters before returning.
    pub async fn run<S, E>(&mut self, mut inbound: S)
    where
        S: Stream<Item = Result<WsMessage, E>> + Unpin,
        E: Display,
    {
        let guard = self.activate();

        loop {
            let frame = match inbound.next().await {
                Some(Ok(frame)) => frame,
                Some(Err(e)) => {
                    tracing::debug!(user_id = %self.identity, error = %e, "WebSocket read error");
                    break;
                }
                None => break,
            };

            let keep_going = match frame {
                WsMessage::Text(text) => self.handle_frame(text.as_str().as_bytes()).await,
                WsMessage::Binary(bytes) => self.handle_frame(&bytes).await,
                WsMessage::Ping(_) | WsMessage::Pong(_) => true,
                WsMessage::Close(_) => {
                    tracing::debug!(user_id = %self.identity, "Client closed connection");
                    false
                }
            };

            if !keep_going {
                break;
            }
        }

        drop(guard);
        self.shutdown();
    }

    /// Move to `Closed` and tell the writer to finish
    ///
    /// Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.state = SessionState::Closed;
        // The writer also stops once every sender is dropped
        let _ = self.handle.close();
        tracing::info!(
            user_id = %self.identity,
            conn_id = %self.handle.id(),
            event = "disconnect",
            "Chat session closed"
        );
    }

    /// Process one inbound frame; `false` ends the session
    async fn handle_frame(&self, frame: &[u8]) -> bool {
        let request = match codec::decode_frame(frame) {
            Ok(request) => request,
            Err(e) if e.is_fatal() => {
                tracing::warn!(user_id = %self.identity, error = %e, "Dropping connection on malformed frame");
                return false;
            }
            Err(e) => {
                tracing::warn!(user_id = %self.identity, error = %e, "Rejected inbound frame");
                return self.reply(Outbound::error(e.to_string())).await;
            }
        };

        tracing::debug!(user_id = %self.identity, request = ?request, "Inbound frame");

        let outcome = self.hub.dispatcher.dispatch(&self.identity, request).await;
        if !self.reply(outcome.reply).await {
            return false;
        }
        if let Some(push) = outcome.push {
            self.push(push);
        }
        true
    }

    async fn reply(&self, frame: Outbound) -> bool {
        match self.handle.deliver(frame).await {
            Ok(()) => true,
            Err(e) => {
                tracing::debug!(user_id = %self.identity, error = %e, "Writer gone, ending session");
                false
            }
        }
    }

    /// Best-effort live delivery; an offline receiver is not an error
    fn push(&self, push: Push) {
        let Some(receiver) = self.hub.presence.lookup(&push.to) else {
            tracing::debug!(user_id = %self.identity, receiver_id = %push.to, "Receiver offline, push skipped");
            return;
        };

        if let Err(e) = receiver.push(push.frame) {
            tracing::warn!(
                user_id = %self.identity,
                receiver_id = %push.to,
                receiver_conn_id = %receiver.id(),
                error = %e,
                "Push to receiver failed"
            );
        }
    }
}
