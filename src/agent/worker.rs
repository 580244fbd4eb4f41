//! Publishing agent worker
//!
//! One [`AgentWorker`] owns one speech source and publishes its transcripts
//! into a room. The worker is an explicitly owned value with a small
//! lifecycle:
//!
//! ```text
//! stopped ──start()──► starting ──► running ──stop()──► stopping ──► stopped
//!                                     │
//!                               source error
//!                                     ▼
//!                                  failed ──start()──► starting
//! ```
//!
//! `stop()` hands the speech source back to the worker, so a stopped or
//! failed worker can be started again with the same source.

use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::registry::RoomRegistry;

use super::error::AgentError;
use super::source::SpeechSource;

/// Worker lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentState {
    Stopped,
    Starting,
    Running,
    Stopping,
    Failed,
}

impl fmt::Display for AgentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AgentState::Stopped => "stopped",
            AgentState::Starting => "starting",
            AgentState::Running => "running",
            AgentState::Stopping => "stopping",
            AgentState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Observable worker events, in order of occurrence
#[derive(Debug, Clone)]
pub enum AgentEvent {
    /// The lifecycle state changed
    StateChanged(AgentState),

    /// A transcript was published to the room
    Published {
        text: String,
        is_final: bool,
        delivered: usize,
    },

    /// The speech source failed; the worker is now failed
    SourceError(String),
}

/// Agent worker configuration
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Room the worker publishes into
    pub room: String,

    /// Capacity of the worker event channel
    pub event_buffer: usize,
}

impl AgentConfig {
    pub fn new(room: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            event_buffer: 64,
        }
    }

    /// Set the event channel capacity
    pub fn event_buffer(mut self, buffer: usize) -> Self {
        self.event_buffer = buffer.max(1);
        self
    }
}

/// Publishes transcripts from a speech source into a room
pub struct AgentWorker<S: SpeechSource> {
    config: AgentConfig,
    registry: Arc<RoomRegistry>,
    source: Option<S>,
    state: Arc<Mutex<AgentState>>,
    event_tx: mpsc::Sender<AgentEvent>,
    shutdown: Arc<Notify>,
    pump: Option<JoinHandle<S>>,
}

impl<S: SpeechSource> AgentWorker<S> {
    /// Create a worker and the event receiver for its single observer.
    pub fn new(
        config: AgentConfig,
        registry: Arc<RoomRegistry>,
        source: S,
    ) -> (Self, mpsc::Receiver<AgentEvent>) {
        let (tx, rx) = mpsc::channel(config.event_buffer);

        let worker = Self {
            config,
            registry,
            source: Some(source),
            state: Arc::new(Mutex::new(AgentState::Stopped)),
            event_tx: tx,
            shutdown: Arc::new(Notify::new()),
            pump: None,
        };

        (worker, rx)
    }

    /// Current lifecycle state
    pub fn state(&self) -> AgentState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Start publishing.
    ///
    /// Fails with [`AgentError::AlreadyRunning`] while the worker is
    /// starting or running. Starting from `failed` is allowed and reuses
    /// the same source.
    pub async fn start(&mut self) -> Result<(), AgentError> {
        if self.config.room.is_empty() {
            return Err(AgentError::InvalidConfig("room must not be empty"));
        }

        match self.state() {
            AgentState::Starting | AgentState::Running | AgentState::Stopping => {
                return Err(AgentError::AlreadyRunning);
            }
            AgentState::Stopped | AgentState::Failed => {}
        }

        // A pump that ended on its own still holds the source; reap it.
        if let Some(pump) = self.pump.take() {
            let source = pump.await.map_err(|e| AgentError::Source(e.to_string()))?;
            self.source = Some(source);
        }

        let source = self
            .source
            .take()
            .ok_or(AgentError::InvalidConfig("speech source was lost"))?;

        // Fresh shutdown handle per cycle so a stale permit from a previous
        // stop cannot end the new pump immediately.
        self.shutdown = Arc::new(Notify::new());
        set_state(&self.state, &self.event_tx, AgentState::Starting);

        tracing::info!(room = %self.config.room, "Agent worker starting");

        self.pump = Some(tokio::spawn(pump(
            source,
            Arc::clone(&self.registry),
            self.config.room.clone(),
            Arc::clone(&self.state),
            self.event_tx.clone(),
            Arc::clone(&self.shutdown),
        )));

        Ok(())
    }

    /// Stop publishing and recover the source.
    ///
    /// Fails with [`AgentError::NotRunning`] unless the worker is starting
    /// or running.
    pub async fn stop(&mut self) -> Result<(), AgentError> {
        match self.state() {
            AgentState::Starting | AgentState::Running => {}
            _ => return Err(AgentError::NotRunning),
        }

        set_state(&self.state, &self.event_tx, AgentState::Stopping);
        self.shutdown.notify_one();

        if let Some(pump) = self.pump.take() {
            let source = pump.await.map_err(|e| AgentError::Source(e.to_string()))?;
            self.source = Some(source);
        }

        set_state(&self.state, &self.event_tx, AgentState::Stopped);
        tracing::info!(room = %self.config.room, "Agent worker stopped");

        Ok(())
    }
}

impl<S: SpeechSource> Drop for AgentWorker<S> {
    fn drop(&mut self) {
        if let Some(pump) = self.pump.take() {
            pump.abort();
        }
    }
}

fn set_state(
    state: &Mutex<AgentState>,
    event_tx: &mpsc::Sender<AgentEvent>,
    next: AgentState,
) {
    {
        let mut state = state.lock().unwrap_or_else(|e| e.into_inner());
        if *state == next {
            return;
        }
        *state = next;
    }
    let _ = event_tx.try_send(AgentEvent::StateChanged(next));
}

/// Publish transcripts until the source ends, fails, or shutdown fires.
/// Returns the source so the worker can be restarted.
async fn pump<S: SpeechSource>(
    mut source: S,
    registry: Arc<RoomRegistry>,
    room: String,
    state: Arc<Mutex<AgentState>>,
    event_tx: mpsc::Sender<AgentEvent>,
    shutdown: Arc<Notify>,
) -> S {
    set_state(&state, &event_tx, AgentState::Running);

    loop {
        let item = tokio::select! {
            _ = shutdown.notified() => break,
            item = source.next_transcript() => item,
        };

        match item {
            Some(Ok(event)) => {
                let text = event.text.clone();
                let is_final = event.is_final;
                let delivered = registry.publish_transcript(&room, event).await;

                tracing::trace!(
                    room = %room,
                    is_final,
                    delivered,
                    "Transcript published"
                );
                let _ = event_tx.try_send(AgentEvent::Published {
                    text,
                    is_final,
                    delivered,
                });
            }
            Some(Err(e)) => {
                tracing::error!(room = %room, error = %e, "Speech source failed");
                let _ = event_tx.try_send(AgentEvent::SourceError(e.to_string()));
                set_state(&state, &event_tx, AgentState::Failed);
                break;
            }
            None => {
                tracing::info!(room = %room, "Speech source ended");
                set_state(&state, &event_tx, AgentState::Stopped);
                break;
            }
        }
    }

    source
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use super::*;
    use crate::agent::source::ChannelSource;
    use crate::protocol::{ServerEvent, TranscriptEvent};

    /// Source that replays a fixed script, then hangs.
    struct ScriptedSource {
        items: VecDeque<Result<TranscriptEvent, AgentError>>,
    }

    impl ScriptedSource {
        fn new(items: Vec<Result<TranscriptEvent, AgentError>>) -> Self {
            Self {
                items: items.into_iter().collect(),
            }
        }
    }

    impl SpeechSource for ScriptedSource {
        async fn next_transcript(&mut self) -> Option<Result<TranscriptEvent, AgentError>> {
            match self.items.pop_front() {
                Some(item) => Some(item),
                None => std::future::pending().await,
            }
        }
    }

    async fn wait_for_state(rx: &mut mpsc::Receiver<AgentEvent>, target: AgentState) {
        loop {
            match rx.recv().await.expect("event stream ended") {
                AgentEvent::StateChanged(state) if state == target => return,
                _ => {}
            }
        }
    }

    #[tokio::test]
    async fn test_worker_pumps_transcripts_into_room() {
        let registry = Arc::new(RoomRegistry::new());
        let (_handle, mut sub_rx) = registry.subscribe("studio", "viewer").await;
        sub_rx.recv().await.unwrap(); // initial status

        let (tx, source) = ChannelSource::new(8);
        let (mut worker, mut events) =
            AgentWorker::new(AgentConfig::new("studio"), Arc::clone(&registry), source);

        worker.start().await.unwrap();
        wait_for_state(&mut events, AgentState::Running).await;

        tx.send(TranscriptEvent::final_text("hello there", "host"))
            .await
            .unwrap();

        let payload = sub_rx.recv().await.unwrap();
        match ServerEvent::decode(&payload).unwrap() {
            ServerEvent::Transcript { data, .. } => assert_eq!(data.text, "hello there"),
            other => panic!("expected transcript, got {:?}", other),
        }

        loop {
            match events.recv().await.unwrap() {
                AgentEvent::Published {
                    text,
                    is_final,
                    delivered,
                } => {
                    assert_eq!(text, "hello there");
                    assert!(is_final);
                    assert_eq!(delivered, 1);
                    break;
                }
                _ => {}
            }
        }

        worker.stop().await.unwrap();
        assert_eq!(worker.state(), AgentState::Stopped);
    }

    #[tokio::test]
    async fn test_start_while_running_fails() {
        let registry = Arc::new(RoomRegistry::new());
        let (_tx, source) = ChannelSource::new(8);
        let (mut worker, mut events) =
            AgentWorker::new(AgentConfig::new("studio"), registry, source);

        worker.start().await.unwrap();
        wait_for_state(&mut events, AgentState::Running).await;

        assert!(matches!(
            worker.start().await,
            Err(AgentError::AlreadyRunning)
        ));

        worker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_without_start_fails() {
        let registry = Arc::new(RoomRegistry::new());
        let (_tx, source) = ChannelSource::new(8);
        let (mut worker, _events) =
            AgentWorker::new(AgentConfig::new("studio"), registry, source);

        assert!(matches!(worker.stop().await, Err(AgentError::NotRunning)));
    }

    #[tokio::test]
    async fn test_empty_room_rejected() {
        let registry = Arc::new(RoomRegistry::new());
        let (_tx, source) = ChannelSource::new(8);
        let (mut worker, _events) = AgentWorker::new(AgentConfig::new(""), registry, source);

        assert!(matches!(
            worker.start().await,
            Err(AgentError::InvalidConfig(_))
        ));
    }

    #[tokio::test]
    async fn test_restart_reuses_source() {
        let registry = Arc::new(RoomRegistry::new());
        let (_handle, mut sub_rx) = registry.subscribe("studio", "viewer").await;
        sub_rx.recv().await.unwrap();

        let (tx, source) = ChannelSource::new(8);
        let (mut worker, mut events) =
            AgentWorker::new(AgentConfig::new("studio"), Arc::clone(&registry), source);

        worker.start().await.unwrap();
        wait_for_state(&mut events, AgentState::Running).await;
        worker.stop().await.unwrap();

        // Second cycle over the same channel
        worker.start().await.unwrap();
        wait_for_state(&mut events, AgentState::Running).await;

        tx.send(TranscriptEvent::final_text("second cycle", "host"))
            .await
            .unwrap();

        let payload = sub_rx.recv().await.unwrap();
        match ServerEvent::decode(&payload).unwrap() {
            ServerEvent::Transcript { data, .. } => assert_eq!(data.text, "second cycle"),
            other => panic!("expected transcript, got {:?}", other),
        }

        worker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_source_error_enters_failed_state() {
        let registry = Arc::new(RoomRegistry::new());
        let source = ScriptedSource::new(vec![
            Ok(TranscriptEvent::final_text("fine", "host")),
            Err(AgentError::Source("microphone unplugged".to_string())),
        ]);
        let (mut worker, mut events) =
            AgentWorker::new(AgentConfig::new("studio"), registry, source);

        worker.start().await.unwrap();
        wait_for_state(&mut events, AgentState::Failed).await;
        assert_eq!(worker.state(), AgentState::Failed);

        // Failed is not running
        assert!(matches!(worker.stop().await, Err(AgentError::NotRunning)));

        // But a fresh start is allowed
        worker.start().await.unwrap();
        wait_for_state(&mut events, AgentState::Running).await;
        worker.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_exhausted_source_stops_cleanly() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx, source) = ChannelSource::new(8);
        let (mut worker, mut events) =
            AgentWorker::new(AgentConfig::new("studio"), registry, source);

        worker.start().await.unwrap();
        wait_for_state(&mut events, AgentState::Running).await;

        drop(tx);
        wait_for_state(&mut events, AgentState::Stopped).await;
        assert_eq!(worker.state(), AgentState::Stopped);
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_reports_zero_delivered() {
        let registry = Arc::new(RoomRegistry::new());
        let (tx, source) = ChannelSource::new(8);
        let (mut worker, mut events) =
            AgentWorker::new(AgentConfig::new("empty-room"), registry, source);

        worker.start().await.unwrap();
        tx.send(TranscriptEvent::interim_text("anyone", "host"))
            .await
            .unwrap();

        loop {
            match events.recv().await.unwrap() {
                AgentEvent::Published {
                    is_final, delivered, ..
                } => {
                    assert!(!is_final);
                    assert_eq!(delivered, 0);
                    break;
                }
                _ => {}
            }
        }

        worker.stop().await.unwrap();
    }
}
