/**
 * Relay Protocol Codec
 *
 * Turns one inbound WebSocket frame into a typed [`Request`]. The frame is
 * decoded exactly once here; handlers never see raw JSON.
 *
 * # Framing
 *
 * The current framing wraps every request in an envelope:
 *
 * ```json
 * {"type": "send", "payload": {"receiver_id": "u2", "content": "hi", "type": "text"}}
 * ```
 *
 * Older clients send the `send` payload bare:
 *
 * ```json
 * {"receiver_id": "u2", "content": "hi", "type": "text"}
 * ```
 *
 * The legacy branch is only taken when the frame does not name an envelope
 * type: `type` is missing, empty, or one of the message content types
 * (`text`, `image`, `audio`, `file`), a top-level `receiver_id` is present
 * and there is no `payload` field. Then the whole frame is the payload of
 * an implicit `send`.
 *
 * # Errors
 *
 * - A frame that is not a JSON object is [`CodecError::Malformed`]; the
 *   transport framing is broken and the session ends
 * - A payload that does not fit its type is [`CodecError::InvalidPayload`];
 *   the sender gets an `error` frame and the session continues
 */

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

use crate::shared::messaging::{HistoryQuery, MessageKind, SendPayload};

/// Envelope type of a send request
pub const SEND: &str = "send";
/// Envelope type of a history request
pub const GET_HISTORY: &str = "get_history";

/// Untyped `{type, payload}` pair, alive for one frame
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub kind: String,
    pub payload: Value,
}

/// A decoded inbound request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Persist a message and push it to the receiver
    Send(SendPayload),
    /// Fetch a page of the conversation with another identity
    GetHistory(HistoryQuery),
    /// Envelope type this relay does not understand
    Unknown(String),
}

/// Frame decoding failures
#[derive(Debug, Error)]
pub enum CodecError {
    /// The frame is not a JSON object
    #[error("malformed frame: {0}")]
    Malformed(#[source] serde_json::Error),

    /// The payload does not match the shape required by its type
    #[error("invalid {kind} payload")]
    InvalidPayload {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

impl CodecError {
    /// Whether the error ends the session instead of producing an `error` frame
    pub fn is_fatal(&self) -> bool {
        matches!(self, CodecError::Malformed(_))
    }
}

/// Parse a frame into its envelope, applying the legacy fallback
pub fn parse_envelope(frame: &[u8]) -> Result<Envelope, CodecError> {
    let mut fields: Map<String, Value> =
        serde_json::from_slice(frame).map_err(CodecError::Malformed)?;

    let declared = fields
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    if is_legacy_send(&fields, &declared) {
        if declared.is_empty() {
            // an empty `type` means the default content type
            fields.remove("type");
        }
        return Ok(Envelope {
            kind: SEND.to_string(),
            payload: Value::Object(fields),
        });
    }

    let payload = fields
        .remove("payload")
        .unwrap_or_else(|| Value::Object(Map::new()));

    Ok(Envelope {
        kind: declared,
        payload,
    })
}

/// Legacy detection; only meaningful when `declared` is not an envelope type
///
/// An untyped frame with a `receiver_id` is always a legacy send. A frame
/// typed with a content type only counts when it carries no `payload`.
fn is_legacy_send(fields: &Map<String, Value>, declared: &str) -> bool {
    if !fields.contains_key("receiver_id") {
        return false;
    }
    if declared.is_empty() {
        return true;
    }
    MessageKind::parse(declared).is_some() && !fields.contains_key("payload")
}

/// Decode an envelope's payload against the shape its type requires
pub fn decode_request(envelope: Envelope) -> Result<Request, CodecError> {
    match envelope.kind.as_str() {
        SEND => decode_payload(SEND, envelope.payload).map(Request::Send),
        GET_HISTORY => decode_payload(GET_HISTORY, envelope.payload).map(Request::GetHistory),
        _ => Ok(Request::Unknown(envelope.kind)),
    }
}

fn decode_payload<T: DeserializeOwned>(kind: &'static str, payload: Value) -> Result<T, CodecError> {
    serde_json::from_value(payload).map_err(|source| CodecError::InvalidPayload { kind, source })
}

/// Parse and decode one frame
pub fn decode_frame(frame: &[u8]) -> Result<Request, CodecError> {
    parse_envelope(frame).and_then(decode_request)
}
