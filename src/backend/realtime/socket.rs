/**
 * Chat WebSocket Endpoint
 *
 * Handles `GET /ws/chat`. By the time this handler runs, the auth
 * middleware has resolved the caller's identity; the handler only checks
 * the `Origin` header and upgrades.
 *
 * After the upgrade the socket is split. The read half feeds the
 * [`RelaySession`]; the write half belongs to a writer task that drains the
 * session's outbound queue. The connection ends when either side stops.
 */

use axum::{
    extract::{
        ws::{Message as WsMessage, WebSocket, WebSocketUpgrade},
        State,
    },
    http::{header::ORIGIN, HeaderMap, StatusCode},
    response::Response,
};
use futures_util::{stream::SplitSink, SinkExt, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;

use crate::backend::error::BackendError;
use crate::backend::middleware::{origin_allowed, AuthUser};
use crate::backend::realtime::presence::Directive;
use crate::backend::realtime::session::{RelayHub, RelaySession};
use crate::backend::server::state::AppState;
use crate::shared::messaging::Identity;

/// How long the writer may take to flush after the session ends
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// WebSocket upgrade handler for the chat relay
pub async fn ws_chat_handler(
    State(app_state): State<AppState>,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    ws: WebSocketUpgrade,
) -> Result<Response, BackendError> {
    let origin = headers
        .get(ORIGIN)
        .and_then(|h| h.to_str().ok())
        .unwrap_or_default();

    if !origin_allowed(origin, &app_state.cors_origins) {
        tracing::warn!(user_id = %user.user_id, origin = %origin, "Rejected WebSocket origin");
        return Err(BackendError::handler(StatusCode::FORBIDDEN, "origin not allowed"));
    }

    let hub = app_state.relay.clone();
    let identity = user.user_id;

    Ok(ws
        .on_failed_upgrade(|e| tracing::warn!(error = %e, "WebSocket upgrade failed"))
        .on_upgrade(move |socket| serve_socket(socket, identity, hub)))
}

/// Run one upgraded connection to completion
pub async fn serve_socket(socket: WebSocket, identity: Identity, hub: RelayHub) {
    let (sink, inbound) = socket.split();
    let (mut session, outbound) = RelaySession::connect(identity, hub);
    let conn_id = session.conn_id();

    let mut writer = tokio::spawn(write_loop(sink, outbound));
    let mut writer_finished = false;

    tokio::select! {
        _ = session.run(inbound) => {}
        _ = &mut writer => {
            writer_finished = true;
            tracing::debug!(conn_id = %conn_id, "Writer ended before reader");
        }
    }

    session.shutdown();
    drop(session);

    if !writer_finished && tokio::time::timeout(WRITER_DRAIN_TIMEOUT, writer).await.is_err() {
        tracing::warn!(conn_id = %conn_id, "Writer did not finish in time");
    }
}

/// Drain directives into the socket until told to close or the queue ends
async fn write_loop(mut sink: SplitSink<WebSocket, WsMessage>, mut outbound: mpsc::Receiver<Directive>) {
    while let Some(directive) = outbound.recv().await {
        match directive {
            Directive::Frame(frame) => {
                let text = match frame.encode() {
                    Ok(text) => text,
                    Err(e) => {
                        tracing::error!(error = %e, frame = frame.kind(), "Failed to encode outbound frame");
                        continue;
                    }
                };
                if let Err(e) = sink.send(WsMessage::Text(text.into())).await {
                    tracing::debug!(error = %e, "WebSocket write failed");
                    break;
                }
            }
            Directive::Close => {
                let _ = sink.send(WsMessage::Close(None)).await;
                break;
            }
        }
    }

    let _ = sink.close().await;
}
