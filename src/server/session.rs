//! Bidirectional control session
//!
//! One [`ControlSession`] per connected control client. It owns at most one
//! room subscription at a time and turns [`ClientMessage`]s into
//! [`ServerResponse`]s plus registry side effects. Transport-agnostic; the
//! WebSocket route drives it, and tests drive it directly.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;

use crate::protocol::{ClientMessage, ServerResponse};
use crate::registry::{RoomRegistry, SubscriberHandle};

/// Outcome of handling one control message
pub enum SessionReply {
    /// A plain response to send back
    Response(ServerResponse),

    /// A subscription was established; `frames` yields the room's payloads
    Subscribed {
        response: ServerResponse,
        frames: mpsc::Receiver<Bytes>,
    },
}

impl SessionReply {
    /// The response part of the reply
    pub fn response(&self) -> &ServerResponse {
        match self {
            SessionReply::Response(response) => response,
            SessionReply::Subscribed { response, .. } => response,
        }
    }
}

/// Server-side state for one control client
pub struct ControlSession {
    registry: Arc<RoomRegistry>,
    default_participant: String,
    subscription: Option<SubscriberHandle>,
}

impl ControlSession {
    pub fn new(registry: Arc<RoomRegistry>, default_participant: impl Into<String>) -> Self {
        Self {
            registry,
            default_participant: default_participant.into(),
            subscription: None,
        }
    }

    /// The room this session is subscribed to, if any
    pub fn room(&self) -> Option<&str> {
        self.subscription.as_ref().map(|h| h.room.as_str())
    }

    /// Handle one raw text message from the client.
    ///
    /// A malformed or unknown-tag message gets an `error` response and does
    /// not affect the session.
    pub async fn handle_text(&mut self, text: &str) -> SessionReply {
        match ClientMessage::decode(text.as_bytes()) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                tracing::warn!(error = %e, "Rejecting control message");
                SessionReply::Response(ServerResponse::error(e.to_string()))
            }
        }
    }

    /// Handle one decoded control message.
    pub async fn handle(&mut self, message: ClientMessage) -> SessionReply {
        match message {
            ClientMessage::Subscribe {
                room_name,
                participant_name,
                ..
            } => {
                let Some(room) = room_name.filter(|r| !r.is_empty()) else {
                    return SessionReply::Response(ServerResponse::error(
                        "subscribe requires roomName",
                    ));
                };
                let participant =
                    participant_name.unwrap_or_else(|| self.default_participant.clone());

                // One subscription per session; replacing drops the old one.
                if let Some(old) = self.subscription.take() {
                    self.registry.unsubscribe(&old).await;
                }

                let (handle, frames) = self.registry.subscribe(&room, &participant).await;
                tracing::info!(connection = %handle, "Control session subscribed");
                self.subscription = Some(handle);

                SessionReply::Subscribed {
                    response: ServerResponse::success(format!("subscribed to {}", room)),
                    frames,
                }
            }

            ClientMessage::Unsubscribe { .. } => match self.subscription.take() {
                Some(handle) => {
                    self.registry.unsubscribe(&handle).await;
                    tracing::info!(connection = %handle, "Control session unsubscribed");
                    SessionReply::Response(ServerResponse::success(format!(
                        "unsubscribed from {}",
                        handle.room
                    )))
                }
                None => {
                    SessionReply::Response(ServerResponse::error("no active subscription"))
                }
            },

            ClientMessage::Control { action, .. } => {
                let action = action.unwrap_or_default();
                tracing::debug!(action = %action, "Control action received");
                SessionReply::Response(ServerResponse::ack(format!(
                    "control action received: {}",
                    action
                )))
            }
        }
    }

    /// Tear the session down, releasing any subscription.
    pub async fn close(&mut self) {
        if let Some(handle) = self.subscription.take() {
            self.registry.unsubscribe(&handle).await;
        }
    }
}
