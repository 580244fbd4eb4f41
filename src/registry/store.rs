//! Room registry implementation
//!
//! The central fan-out registry that routes transcript and status events from
//! the publishing agent to every subscriber of a room.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use bytes::Bytes;
use tokio::sync::{mpsc, RwLock};

use crate::protocol::{now_ms, ConnectionState, ServerEvent, TranscriptEvent};

use super::config::RegistryConfig;
use super::handle::{SubscriberEntry, SubscriberHandle};

/// Central registry of rooms and their subscribers
///
/// Thread-safe via `RwLock`; publish is the read-heavy path and only takes
/// the write lock when a dead sink has to be evicted. The invariant held
/// everywhere: a room with zero subscribers is absent from the map.
pub struct RoomRegistry {
    /// Map of room name to that room's subscribers, keyed by connection id
    rooms: RwLock<HashMap<String, HashMap<u64, SubscriberEntry>>>,

    /// Next connection id to allocate
    next_connection_id: AtomicU64,

    /// Configuration
    config: RegistryConfig,
}

impl RoomRegistry {
    /// Create a new registry with default configuration
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Create a new registry with custom configuration
    pub fn with_config(config: RegistryConfig) -> Self {
        Self {
            rooms: RwLock::new(HashMap::new()),
            next_connection_id: AtomicU64::new(1),
            config,
        }
    }

    /// Get the registry configuration
    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Register a subscriber under `room`
    ///
    /// Creates the room entry on demand. The returned receiver yields the
    /// JSON payloads published to the room, starting with a single
    /// `status: connected` frame enqueued to this subscriber only.
    pub async fn subscribe(
        &self,
        room: &str,
        participant: &str,
    ) -> (SubscriberHandle, mpsc::Receiver<Bytes>) {
        let connection_id = self.next_connection_id.fetch_add(1, Ordering::Relaxed);
        let (tx, rx) = mpsc::channel(self.config.sink_capacity);

        // Initial status frame; the channel is empty so this cannot fail.
        let hello = ServerEvent::status(
            ConnectionState::Connected,
            Some("Connected to transcript stream".to_string()),
        );
        let _ = tx.try_send(hello.encode());

        let handle = SubscriberHandle {
            room: room.to_string(),
            participant: participant.to_string(),
            connection_id,
        };

        let mut rooms = self.rooms.write().await;
        rooms.entry(room.to_string()).or_default().insert(
            connection_id,
            SubscriberEntry {
                participant: participant.to_string(),
                sink: tx,
            },
        );

        tracing::info!(
            room = %room,
            connection = %handle,
            subscribers = rooms.get(room).map(HashMap::len).unwrap_or(0),
            "Subscriber added"
        );

        (handle, rx)
    }

    /// Remove a subscriber
    ///
    /// If the room's set becomes empty, the room entry itself is removed so
    /// short-lived rooms do not accumulate.
    pub async fn unsubscribe(&self, handle: &SubscriberHandle) {
        let mut rooms = self.rooms.write().await;

        if let Some(subscribers) = rooms.get_mut(&handle.room) {
            if subscribers.remove(&handle.connection_id).is_some() {
                tracing::debug!(
                    room = %handle.room,
                    connection = %handle,
                    subscribers = subscribers.len(),
                    "Subscriber removed"
                );
            }

            if subscribers.is_empty() {
                rooms.remove(&handle.room);
                tracing::info!(room = %handle.room, "Room removed (no subscribers)");
            }
        }
    }

    /// Fan out an event to every subscriber of `room`
    ///
    /// Returns the number of sinks the event was delivered to. A sink write
    /// failure evicts that subscriber without affecting delivery to the
    /// others; there is no retry. Publishing to an absent room is a no-op
    /// and allocates nothing.
    pub async fn publish(&self, room: &str, event: &ServerEvent) -> usize {
        let payload = event.encode();
        if payload.is_empty() {
            return 0;
        }

        let mut failed: Vec<u64> = Vec::new();
        let mut delivered = 0;

        {
            let rooms = self.rooms.read().await;
            let Some(subscribers) = rooms.get(room) else {
                return 0;
            };

            for (connection_id, entry) in subscribers {
                // Fire-and-forget: a full sink means the consumer is not
                // draining, which we treat the same as a closed one.
                match entry.sink.try_send(payload.clone()) {
                    Ok(()) => delivered += 1,
                    Err(e) => {
                        tracing::warn!(
                            room = %room,
                            connection_id = connection_id,
                            participant = %entry.participant,
                            error = %e,
                            "Sink write failed, evicting subscriber"
                        );
                        failed.push(*connection_id);
                    }
                }
            }
        }

        if !failed.is_empty() {
            self.evict(room, &failed).await;
        }

        delivered
    }

    /// Publish a transcript event to a room
    pub async fn publish_transcript(&self, room: &str, transcript: TranscriptEvent) -> usize {
        let session_id = format!("{}:{}", room, now_ms());
        self.publish(room, &ServerEvent::transcript(session_id, transcript))
            .await
    }

    /// Publish a status update to a room
    pub async fn publish_status(
        &self,
        room: &str,
        status: ConnectionState,
        message: Option<String>,
    ) -> usize {
        self.publish(room, &ServerEvent::status(status, message)).await
    }

    /// Remove failed subscribers, dropping the room when it empties
    async fn evict(&self, room: &str, connection_ids: &[u64]) {
        let mut rooms = self.rooms.write().await;

        if let Some(subscribers) = rooms.get_mut(room) {
            for id in connection_ids {
                subscribers.remove(id);
            }

            if subscribers.is_empty() {
                rooms.remove(room);
                tracing::info!(room = %room, "Room removed (all subscribers evicted)");
            }
        }
    }

    /// Whether `room` currently has any subscribers
    pub async fn has_room(&self, room: &str) -> bool {
        self.rooms.read().await.contains_key(room)
    }

    /// Number of subscribers in `room` (0 when absent)
    pub async fn subscriber_count(&self, room: &str) -> usize {
        self.rooms
            .read()
            .await
            .get(room)
            .map(HashMap::len)
            .unwrap_or(0)
    }

    /// Number of rooms with at least one subscriber
    pub async fn room_count(&self) -> usize {
        self.rooms.read().await.len()
    }

    /// Diagnostic snapshot of the registry
    pub async fn connection_info(&self) -> ConnectionInfo {
        let rooms = self.rooms.read().await;

        ConnectionInfo {
            total_connections: rooms.values().map(HashMap::len).sum(),
            room_connections: rooms
                .iter()
                .map(|(room, subs)| (room.clone(), subs.len()))
                .collect(),
        }
    }
}

impl Default for RoomRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of registry occupancy, for status endpoints and debugging
#[derive(Debug, Clone, serde::Serialize)]
pub struct ConnectionInfo {
    /// Total subscribers across all rooms
    #[serde(rename = "totalConnections")]
    pub total_connections: usize,
    /// Subscriber count per room
    #[serde(rename = "roomConnections")]
    pub room_connections: HashMap<String, usize>,
}
