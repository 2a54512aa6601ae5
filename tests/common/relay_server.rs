//! Test relay server and WebSocket client helpers
//!
//! Starts the real router on an ephemeral port with an in-memory store the
//! test can inspect, and wraps `tokio-tungstenite` for JSON frames.

use capsule_relay::backend::messaging::InMemoryMessageStore;
use capsule_relay::backend::server::config::RelayConfigBuilder;
use capsule_relay::backend::server::{create_app_with_store, RelayConfig};
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{HeaderValue, StatusCode};
use tokio_tungstenite::tungstenite::{Error as WsError, Message};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

use super::auth_helpers::{create_test_token, TEST_JWT_SECRET};

pub type WsClient = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A relay listening on 127.0.0.1 for the duration of a test
pub struct TestRelay {
    pub addr: SocketAddr,
    pub store: Arc<InMemoryMessageStore>,
    task: JoinHandle<()>,
}

impl Drop for TestRelay {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Start a relay with test defaults
pub async fn spawn_relay() -> TestRelay {
    spawn_relay_with(|builder| builder).await
}

/// Start a relay, adjusting the configuration first
pub async fn spawn_relay_with<F>(configure: F) -> TestRelay
where
    F: FnOnce(RelayConfigBuilder) -> RelayConfigBuilder,
{
    let builder = RelayConfig::builder()
        .environment("test")
        .jwt_secret(TEST_JWT_SECRET)
        .cors_origins(["http://localhost:3000"]);
    let config = configure(builder).build().expect("valid test config");

    let store = Arc::new(InMemoryMessageStore::new());
    let app = create_app_with_store(&config, store.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestRelay { addr, store, task }
}

impl TestRelay {
    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws/chat", self.addr)
    }

    /// Open a chat connection authenticated with a bearer header
    pub async fn connect(&self, user_id: &str) -> WsClient {
        self.try_connect(Some(&create_test_token(user_id)), None)
            .await
            .unwrap_or_else(|status| panic!("Upgrade for {} failed with {}", user_id, status))
    }

    /// Open a chat connection, returning the HTTP status on rejection
    pub async fn try_connect(
        &self,
        bearer: Option<&str>,
        origin: Option<&str>,
    ) -> Result<WsClient, StatusCode> {
        let mut request = self.ws_url().into_client_request().unwrap();
        if let Some(token) = bearer {
            request.headers_mut().insert(
                "Authorization",
                HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
            );
        }
        if let Some(origin) = origin {
            request
                .headers_mut()
                .insert("Origin", HeaderValue::from_str(origin).unwrap());
        }
        connect_request(request).await
    }

    /// Open a chat connection with the token in the query string
    pub async fn connect_with_query_token(&self, token: &str) -> Result<WsClient, StatusCode> {
        let request = format!("{}?token={}", self.ws_url(), token)
            .into_client_request()
            .unwrap();
        connect_request(request).await
    }

    /// `GET /health` over a raw HTTP/1.1 connection
    pub async fn health(&self) -> Value {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        let body = response
            .split_once("\r\n\r\n")
            .map(|(_, body)| body)
            .expect("HTTP response has a body");
        serde_json::from_str(body).expect("health body is JSON")
    }

    /// Poll `/health` until `online` reaches `expected`
    pub async fn wait_for_online(&self, expected: u64) {
        for _ in 0..100 {
            if self.health().await["online"] == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
        panic!("online count never reached {}", expected);
    }
}

async fn connect_request(
    request: tokio_tungstenite::tungstenite::handshake::client::Request,
) -> Result<WsClient, StatusCode> {
    match tokio_tungstenite::connect_async(request).await {
        Ok((ws, _)) => Ok(ws),
        Err(WsError::Http(response)) => Err(response.status()),
        Err(e) => panic!("WebSocket connect failed: {}", e),
    }
}

pub async fn send_json(ws: &mut WsClient, frame: Value) {
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
}

pub async fn send_raw(ws: &mut WsClient, frame: &str) {
    ws.send(Message::Text(frame.to_string().into())).await.unwrap();
}

/// Next text frame as JSON, skipping control frames
pub async fn recv_json(ws: &mut WsClient) -> Value {
    loop {
        let next = tokio::time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timed out waiting for frame");
        match next {
            Some(Ok(Message::Text(text))) => {
                return serde_json::from_str(text.as_str()).expect("frame is JSON");
            }
            Some(Ok(Message::Ping(_))) | Some(Ok(Message::Pong(_))) => continue,
            other => panic!("Expected text frame, got {:?}", other),
        }
    }
}

/// Whether the server closes the connection before sending any data frame
pub async fn recv_closed(ws: &mut WsClient) -> bool {
    loop {
        match tokio::time::timeout(RECV_TIMEOUT, ws.next()).await {
            Err(_) => return false,
            Ok(None) | Ok(Some(Err(_))) | Ok(Some(Ok(Message::Close(_)))) => return true,
            Ok(Some(Ok(Message::Ping(_)))) | Ok(Some(Ok(Message::Pong(_)))) => continue,
            Ok(Some(Ok(_))) => return false,
        }
    }
}

/// Round-trip a `get_history` so the session is known to be registered
pub async fn wait_ready(ws: &mut WsClient, peer: &str) {
    send_json(
        ws,
        json!({"type": "get_history", "payload": {"user_id": peer}}),
    )
    .await;
    let reply = recv_json(ws).await;
    assert_eq!(reply["type"], "history", "unexpected reply {}", reply);
}

pub fn send_frame(receiver_id: &str, content: &str) -> Value {
    json!({
        "type": "send",
        "payload": {"receiver_id": receiver_id, "content": content, "type": "text"}
    })
}
