//! Wire message envelopes
//!
//! Tagged JSON unions for both directions: server-to-client event frames and
//! the client-to-server control protocol. Tags are validated once at the
//! transport boundary; an unrecognized tag is a [`ParseError`], never a
//! silent fall-through.

use serde::{Deserialize, Serialize};

use super::event::{ConnectionState, TranscriptEvent};

/// Server-to-client event frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerEvent {
    /// A transcript segment fanned out to the room
    Transcript {
        data: TranscriptEvent,
        #[serde(rename = "sessionId")]
        session_id: String,
    },

    /// A stream status update
    Status {
        status: ConnectionState,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<String>,
        timestamp: i64,
    },
}

impl ServerEvent {
    /// Wire tags this union recognizes
    const TAGS: &'static [&'static str] = &["transcript", "status"];

    /// Build a transcript frame. The session id ties the frame to the
    /// publishing room and instant.
    pub fn transcript(session_id: impl Into<String>, data: TranscriptEvent) -> Self {
        ServerEvent::Transcript {
            data,
            session_id: session_id.into(),
        }
    }

    /// Build a status frame with the current timestamp.
    pub fn status(status: ConnectionState, message: Option<String>) -> Self {
        ServerEvent::Status {
            status,
            message,
            timestamp: super::event::now_ms(),
        }
    }

    /// Decode a frame payload, distinguishing malformed JSON from an
    /// unrecognized `type` tag.
    pub fn decode(payload: &[u8]) -> Result<Self, ParseError> {
        decode_tagged(payload, Self::TAGS)
    }

    /// Serialize to the wire JSON.
    pub fn encode(&self) -> bytes::Bytes {
        // Serialization of these enums cannot fail; fall back to an empty
        // payload rather than poisoning the publish path.
        match serde_json::to_vec(self) {
            Ok(v) => bytes::Bytes::from(v),
            Err(e) => {
                tracing::error!(error = %e, "failed to encode server event");
                bytes::Bytes::new()
            }
        }
    }
}

/// Client-to-server control message (bidirectional transport)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ClientMessage {
    /// Subscribe to a room's transcript stream
    Subscribe {
        #[serde(rename = "roomName", skip_serializing_if = "Option::is_none")]
        room_name: Option<String>,
        #[serde(rename = "participantName", skip_serializing_if = "Option::is_none")]
        participant_name: Option<String>,
        timestamp: i64,
    },

    /// Drop the current subscription
    Unsubscribe { timestamp: i64 },

    /// Agent control command (start/stop/pause/resume/clear)
    Control {
        #[serde(skip_serializing_if = "Option::is_none")]
        action: Option<String>,
        timestamp: i64,
    },
}

impl ClientMessage {
    /// Wire tags this union recognizes
    const TAGS: &'static [&'static str] = &["subscribe", "unsubscribe", "control"];

    /// Decode a control message, distinguishing malformed JSON from an
    /// unrecognized `type` tag.
    pub fn decode(payload: &[u8]) -> Result<Self, ParseError> {
        decode_tagged(payload, Self::TAGS)
    }
}

/// Server response on the bidirectional transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ServerResponse {
    Success {
        message: String,
        timestamp: i64,
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    Error {
        message: String,
        timestamp: i64,
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
    Ack {
        message: String,
        timestamp: i64,
        #[serde(rename = "requestId", skip_serializing_if = "Option::is_none")]
        request_id: Option<String>,
    },
}

impl ServerResponse {
    pub fn success(message: impl Into<String>) -> Self {
        ServerResponse::Success {
            message: message.into(),
            timestamp: super::event::now_ms(),
            request_id: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ServerResponse::Error {
            message: message.into(),
            timestamp: super::event::now_ms(),
            request_id: None,
        }
    }

    pub fn ack(message: impl Into<String>) -> Self {
        ServerResponse::Ack {
            message: message.into(),
            timestamp: super::event::now_ms(),
            request_id: None,
        }
    }

    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Error decoding a received frame
///
/// Isolated to the offending frame: the caller logs it and moves on without
/// touching connection state.
#[derive(Debug)]
pub enum ParseError {
    /// Payload is not valid JSON
    Json(serde_json::Error),
    /// Valid JSON, but the `type` tag is missing or unrecognized
    UnknownType(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::Json(e) => write!(f, "invalid JSON frame: {}", e),
            ParseError::UnknownType(tag) => write!(f, "unknown message type: {}", tag),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Json(e) => Some(e),
            ParseError::UnknownType(_) => None,
        }
    }
}

/// Parse the payload as JSON first and vet the `type` tag against the known
/// set, so an unknown tag is reported by name while a recognized tag over
/// malformed fields stays a JSON error.
fn decode_tagged<T: serde::de::DeserializeOwned>(
    payload: &[u8],
    known_tags: &[&str],
) -> Result<T, ParseError> {
    let value: serde_json::Value = serde_json::from_slice(payload).map_err(ParseError::Json)?;

    if let Some(tag) = value.get("type").and_then(|t| t.as_str()) {
        if !known_tags.contains(&tag) {
            return Err(ParseError::UnknownType(tag.to_string()));
        }
    }

    serde_json::from_value(value).map_err(ParseError::Json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_frame_roundtrip() {
        let event = ServerEvent::transcript(
            "studio:1700000000000",
            TranscriptEvent::final_text("hello there", "speaker"),
        );

        let bytes = event.encode();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["type"], "transcript");
        assert_eq!(json["sessionId"], "studio:1700000000000");
        assert_eq!(json["data"]["text"], "hello there");

        let back = ServerEvent::decode(&bytes).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_status_frame_omits_empty_message() {
        let event = ServerEvent::status(ConnectionState::Connected, None);
        let json: serde_json::Value = serde_json::from_slice(&event.encode()).unwrap();

        assert_eq!(json["type"], "status");
        assert_eq!(json["status"], "connected");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_unknown_type_is_parse_error() {
        let err = ServerEvent::decode(br#"{"type":"telemetry","payload":1}"#).unwrap_err();
        match err {
            ParseError::UnknownType(tag) => assert_eq!(tag, "telemetry"),
            other => panic!("expected UnknownType, got {:?}", other),
        }
    }

    #[test]
    fn test_known_tag_with_malformed_fields_is_json_error() {
        // The tag is recognized; only the payload shape is wrong
        let err = ServerEvent::decode(br#"{"type":"transcript","data":5}"#).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));

        let err = ClientMessage::decode(br#"{"type":"subscribe","timestamp":"soon"}"#)
            .unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let err = ServerEvent::decode(b"data: not json").unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_missing_type_tag_is_json_error() {
        let err = ClientMessage::decode(br#"{"roomName":"studio"}"#).unwrap_err();
        assert!(matches!(err, ParseError::Json(_)));
    }

    #[test]
    fn test_client_message_decode_subscribe() {
        let msg = ClientMessage::decode(
            br#"{"type":"subscribe","roomName":"studio","participantName":"viewer","timestamp":1}"#,
        )
        .unwrap();

        match msg {
            ClientMessage::Subscribe {
                room_name,
                participant_name,
                ..
            } => {
                assert_eq!(room_name.as_deref(), Some("studio"));
                assert_eq!(participant_name.as_deref(), Some("viewer"));
            }
            other => panic!("expected Subscribe, got {:?}", other),
        }
    }

    #[test]
    fn test_server_response_tags() {
        let json: serde_json::Value =
            serde_json::from_str(&ServerResponse::error("nope").encode()).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["message"], "nope");
        assert!(json.get("requestId").is_none());
    }
}
