//! Core event types shared by the server fan-out and the client stream
//!
//! These mirror the wire JSON exactly (camelCase field names), so the same
//! types serve both serialization boundaries.

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// One recognized utterance segment from the speech engine.
///
/// Immutable once constructed. Interim segments (`is_final == false`) are for
/// display only; only final segments drive script alignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEvent {
    /// Recognized text
    pub text: String,

    /// Whether the engine will revise this segment further
    pub is_final: bool,

    /// Capture timestamp in milliseconds since the epoch
    pub timestamp: i64,

    /// Identity of the speaking participant
    pub participant_identity: String,

    /// Engine confidence in `[0, 1]`, when reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,

    /// Per-word timing, when the engine provides it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_timestamps: Option<Vec<WordTimestamp>>,
}

impl TranscriptEvent {
    /// Create a final transcript event with the current timestamp.
    pub fn final_text(text: impl Into<String>, participant: impl Into<String>) -> Self {
        Self::new(text, true, participant)
    }

    /// Create an interim transcript event with the current timestamp.
    pub fn interim_text(text: impl Into<String>, participant: impl Into<String>) -> Self {
        Self::new(text, false, participant)
    }

    fn new(text: impl Into<String>, is_final: bool, participant: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_final,
            timestamp: now_ms(),
            participant_identity: participant.into(),
            confidence: None,
            word_timestamps: None,
        }
    }
}

/// Timing for a single recognized word
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WordTimestamp {
    /// The word as recognized
    pub word: String,
    /// Start offset in seconds
    pub start_time: f64,
    /// End offset in seconds
    pub end_time: f64,
    /// Engine confidence in `[0, 1]`
    pub confidence: f32,
}

/// Connection state of a transcript stream
///
/// Exactly one current value per stream instance. Serialized lowercase to
/// match the wire format of status messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    /// Connection attempt in progress
    Connecting,
    /// Stream is open and delivering events
    Connected,
    /// Not connected; no automatic attempt pending
    Disconnected,
    /// Waiting out the backoff delay before the next attempt
    Reconnecting,
    /// Retries exhausted or reconnect disabled; manual `connect()` required
    Error,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ConnectionState::Connecting => "connecting",
            ConnectionState::Connected => "connected",
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Reconnecting => "reconnecting",
            ConnectionState::Error => "error",
        };
        f.write_str(s)
    }
}

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcript_event_wire_fields() {
        let event = TranscriptEvent {
            text: "hello there".to_string(),
            is_final: true,
            timestamp: 1_700_000_000_000,
            participant_identity: "speaker".to_string(),
            confidence: Some(0.92),
            word_timestamps: None,
        };

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["text"], "hello there");
        assert_eq!(json["isFinal"], true);
        assert_eq!(json["participantIdentity"], "speaker");
        // Absent optional fields are omitted entirely
        assert!(json.get("wordTimestamps").is_none());
    }

    #[test]
    fn test_transcript_event_roundtrip_with_words() {
        let event = TranscriptEvent {
            text: "hello".to_string(),
            is_final: false,
            timestamp: 42,
            participant_identity: "speaker".to_string(),
            confidence: None,
            word_timestamps: Some(vec![WordTimestamp {
                word: "hello".to_string(),
                start_time: 0.1,
                end_time: 0.4,
                confidence: 0.8,
            }]),
        };

        let json = serde_json::to_string(&event).unwrap();
        let back: TranscriptEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_connection_state_serializes_lowercase() {
        let json = serde_json::to_string(&ConnectionState::Reconnecting).unwrap();
        assert_eq!(json, "\"reconnecting\"");

        let state: ConnectionState = serde_json::from_str("\"error\"").unwrap();
        assert_eq!(state, ConnectionState::Error);
    }

    #[test]
    fn test_now_ms_is_positive() {
        assert!(now_ms() > 0);
    }
}
