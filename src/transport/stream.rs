//! Client transcript stream
//!
//! One [`TranscriptStream`] owns one logical subscription for a
//! `(room, participant)` pair and runs the connect/reconnect state machine:
//!
//! ```text
//! disconnected ──connect()──► connecting ──open──► connected
//!      ▲                          │  ▲                 │
//!      │                    error │  │ backoff         │ error
//!      │                          ▼  │ elapsed         ▼
//!   disconnect()              reconnecting ◄────(attempts < max)
//!                                  │
//!                                  │ attempts == max
//!                                  ▼
//!                                error ──connect()──► connecting
//! ```
//!
//! The backoff is a fixed interval with a capped attempt count. All
//! observable output flows through a single ordered event channel; the
//! consumer reads state transitions, statuses, and transcripts from the same
//! receiver and never sees an exception cross that boundary.

use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::protocol::{ConnectionState, ServerEvent, TranscriptEvent};

use super::config::StreamConfig;
use super::connector::{Connection, Connector};
use super::error::TransportError;

/// Events delivered to the stream consumer, in arrival order
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// The connection state changed
    StateChanged(ConnectionState),

    /// A status frame arrived from the server
    Status {
        status: ConnectionState,
        message: Option<String>,
        timestamp: i64,
    },

    /// A transcript frame arrived from the server
    Transcript(TranscriptEvent),
}

#[derive(Debug)]
struct Shared {
    state: ConnectionState,
    attempts: u32,
    last_error: Option<String>,
}

/// Client-side transcript stream with automatic reconnect
///
/// # Example
/// ```no_run
/// use std::sync::Arc;
/// use teleprompt_rs::registry::RoomRegistry;
/// use teleprompt_rs::transport::{LocalConnector, StreamConfig, TranscriptStream};
///
/// # async fn example() -> Result<(), teleprompt_rs::transport::TransportError> {
/// let registry = Arc::new(RoomRegistry::new());
/// let config = StreamConfig::new("studio", "viewer");
/// let (mut stream, mut events) =
///     TranscriptStream::new(config, LocalConnector::new(registry));
///
/// stream.connect()?;
/// while let Some(event) = events.recv().await {
///     println!("{:?}", event);
/// }
/// # Ok(())
/// # }
/// ```
pub struct TranscriptStream<C: Connector> {
    config: StreamConfig,
    connector: C,
    shared: Arc<Mutex<Shared>>,
    event_tx: mpsc::Sender<StreamEvent>,
    driver: Option<JoinHandle<()>>,
}

impl<C: Connector> TranscriptStream<C> {
    /// Create a stream and the event receiver for its single consumer.
    pub fn new(config: StreamConfig, connector: C) -> (Self, mpsc::Receiver<StreamEvent>) {
        let (tx, rx) = mpsc::channel(config.event_buffer);

        let stream = Self {
            config,
            connector,
            shared: Arc::new(Mutex::new(Shared {
                state: ConnectionState::Disconnected,
                attempts: 0,
                last_error: None,
            })),
            event_tx: tx,
            driver: None,
        };

        (stream, rx)
    }

    /// Start (or restart) the subscription.
    ///
    /// Idempotent: a call while already `connecting` or `connected` is a
    /// no-op. A call from `reconnecting` cancels the pending backoff and
    /// starts over immediately; a call from the terminal `error` state
    /// resets the attempt counter and begins a fresh cycle. Must run inside
    /// a tokio runtime.
    pub fn connect(&mut self) -> Result<(), TransportError> {
        if self.config.room.is_empty() {
            return Err(TransportError::InvalidSubscription("room must not be empty"));
        }
        if self.config.participant.is_empty() {
            return Err(TransportError::InvalidSubscription(
                "participant must not be empty",
            ));
        }

        {
            let mut shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
            match shared.state {
                ConnectionState::Connecting | ConnectionState::Connected => return Ok(()),
                _ => {}
            }
            shared.attempts = 0;
            shared.last_error = None;
        }
        // A driver parked in the backoff sleep would otherwise survive as a
        // detached task and open a second connection when its timer fires.
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }

        set_state(&self.shared, &self.event_tx, ConnectionState::Connecting);

        tracing::debug!(
            room = %self.config.room,
            participant = %self.config.participant,
            "Opening transcript stream"
        );

        self.driver = Some(tokio::spawn(drive(
            self.config.clone(),
            Arc::clone(&self.shared),
            self.event_tx.clone(),
            self.connector.clone(),
        )));

        Ok(())
    }

    /// Tear the subscription down.
    ///
    /// Cancels any pending reconnect timer deterministically, closes the
    /// underlying connection, and resets to `disconnected` with the attempt
    /// counter cleared. Safe to call in any state; never fails.
    pub fn disconnect(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }

        let was_disconnected = {
            let mut shared = self.shared.lock().unwrap_or_else(|e| e.into_inner());
            shared.attempts = 0;
            shared.state == ConnectionState::Disconnected
        };

        if !was_disconnected {
            set_state(&self.shared, &self.event_tx, ConnectionState::Disconnected);
        }
    }

    /// Current connection state
    pub fn state(&self) -> ConnectionState {
        self.shared.lock().unwrap_or_else(|e| e.into_inner()).state
    }

    /// Whether the stream is currently connected
    pub fn is_connected(&self) -> bool {
        self.state() == ConnectionState::Connected
    }

    /// Reconnect attempts consumed in the current cycle
    pub fn reconnect_attempts(&self) -> u32 {
        self.shared.lock().unwrap_or_else(|e| e.into_inner()).attempts
    }

    /// Reason for the most recent failure, if any
    pub fn last_error(&self) -> Option<String> {
        self.shared
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last_error
            .clone()
    }
}

impl<C: Connector> Drop for TranscriptStream<C> {
    fn drop(&mut self) {
        if let Some(driver) = self.driver.take() {
            driver.abort();
        }
    }
}

/// Record the transition and surface it on the event channel.
///
/// Uses `try_send` so state changes are observable at the instant of the
/// transition; a consumer that has fallen `event_buffer` behind loses the
/// notification rather than stalling the transport.
fn set_state(
    shared: &Mutex<Shared>,
    event_tx: &mpsc::Sender<StreamEvent>,
    state: ConnectionState,
) {
    {
        let mut shared = shared.lock().unwrap_or_else(|e| e.into_inner());
        if shared.state == state {
            return;
        }
        shared.state = state;
    }
    let _ = event_tx.try_send(StreamEvent::StateChanged(state));
}

enum PumpEnd {
    Clean,
    Failed(String),
}

/// Reconnect loop: one iteration per connection attempt.
async fn drive<C: Connector>(
    config: StreamConfig,
    shared: Arc<Mutex<Shared>>,
    event_tx: mpsc::Sender<StreamEvent>,
    mut connector: C,
) {
    loop {
        let failure = match connector.connect(&config.room, &config.participant).await {
            Ok(mut conn) => {
                set_state(&shared, &event_tx, ConnectionState::Connected);
                {
                    let mut shared = shared.lock().unwrap_or_else(|e| e.into_inner());
                    shared.attempts = 0;
                    shared.last_error = None;
                }

                match pump(&mut conn, &event_tx).await {
                    PumpEnd::Clean => {
                        set_state(&shared, &event_tx, ConnectionState::Disconnected);
                        return;
                    }
                    PumpEnd::Failed(reason) => reason,
                }
            }
            Err(e) => e.to_string(),
        };

        tracing::warn!(
            room = %config.room,
            participant = %config.participant,
            error = %failure,
            "Transcript stream failed"
        );

        let attempts = {
            let mut shared = shared.lock().unwrap_or_else(|e| e.into_inner());
            shared.last_error = Some(failure);
            shared.attempts
        };

        if !config.auto_reconnect || attempts >= config.max_reconnect_attempts {
            set_state(&shared, &event_tx, ConnectionState::Error);
            return;
        }

        {
            let mut shared = shared.lock().unwrap_or_else(|e| e.into_inner());
            shared.attempts += 1;
        }
        set_state(&shared, &event_tx, ConnectionState::Reconnecting);

        tokio::time::sleep(config.reconnect_interval).await;
        set_state(&shared, &event_tx, ConnectionState::Connecting);
    }
}

/// Deliver frames from one open connection until it ends.
///
/// A frame that fails to parse is logged and dropped; it affects neither
/// subsequent frames nor the connection state.
async fn pump<T: Connection>(conn: &mut T, event_tx: &mpsc::Sender<StreamEvent>) -> PumpEnd {
    loop {
        match conn.next_frame().await {
            Some(Ok(payload)) => match ServerEvent::decode(&payload) {
                Ok(ServerEvent::Transcript { data, .. }) => {
                    if event_tx.send(StreamEvent::Transcript(data)).await.is_err() {
                        // Consumer is gone; nothing left to deliver to.
                        return PumpEnd::Clean;
                    }
                }
                Ok(ServerEvent::Status {
                    status,
                    message,
                    timestamp,
                }) => {
                    let event = StreamEvent::Status {
                        status,
                        message,
                        timestamp,
                    };
                    if event_tx.send(event).await.is_err() {
                        return PumpEnd::Clean;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Discarding malformed frame");
                }
            },
            Some(Err(e)) => return PumpEnd::Failed(e.to_string()),
            None => return PumpEnd::Clean,
        }
    }
}
