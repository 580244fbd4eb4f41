//! Connector seam for the stream transport
//!
//! The driver loop in [`stream`](super::stream) is written against these two
//! traits so the same state machine runs over an in-process registry
//! subscription, an HTTP event-stream, or a scripted double in tests.
//!
//! A connector must be `Clone`: every reconnect attempt starts from a fresh
//! clone-owned connection, and a manual `connect()` after a terminal error
//! reuses the same connector value.

use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use futures_util::StreamExt;
use tokio::sync::mpsc;

use crate::registry::{RoomRegistry, SubscriberHandle};

use super::error::TransportError;

/// Opens one connection per call
pub trait Connector: Clone + Send + 'static {
    type Connection: Connection;

    /// Open a subscription for `(room, participant)`.
    fn connect(
        &mut self,
        room: &str,
        participant: &str,
    ) -> impl Future<Output = Result<Self::Connection, TransportError>> + Send;
}

/// One open subscription yielding complete JSON frame payloads
pub trait Connection: Send {
    /// Next frame payload. `None` is a clean end of stream; `Some(Err(_))`
    /// is a transport-level failure that enters the reconnect path.
    fn next_frame(
        &mut self,
    ) -> impl Future<Output = Option<Result<Bytes, TransportError>>> + Send;
}

/// Connector that subscribes directly to an in-process [`RoomRegistry`]
///
/// Used when client and broadcaster share a process, and by the transport
/// tests.
#[derive(Clone)]
pub struct LocalConnector {
    registry: Arc<RoomRegistry>,
}

impl LocalConnector {
    pub fn new(registry: Arc<RoomRegistry>) -> Self {
        Self { registry }
    }
}

impl Connector for LocalConnector {
    type Connection = LocalConnection;

    async fn connect(
        &mut self,
        room: &str,
        participant: &str,
    ) -> Result<Self::Connection, TransportError> {
        let (handle, rx) = self.registry.subscribe(room, participant).await;

        Ok(LocalConnection {
            registry: Arc::clone(&self.registry),
            handle: Some(handle),
            rx,
        })
    }
}

/// In-process subscription backed by a registry sink
pub struct LocalConnection {
    registry: Arc<RoomRegistry>,
    handle: Option<SubscriberHandle>,
    rx: mpsc::Receiver<Bytes>,
}

impl Connection for LocalConnection {
    async fn next_frame(&mut self) -> Option<Result<Bytes, TransportError>> {
        // Sender dropped means we were evicted or the registry went away;
        // either way the subscription is over.
        self.rx.recv().await.map(Ok)
    }
}

impl Drop for LocalConnection {
    fn drop(&mut self) {
        // Best-effort unsubscribe so the room is GC'd promptly rather than
        // on the next publish.
        if let Some(handle) = self.handle.take() {
            let registry = Arc::clone(&self.registry);
            if let Ok(rt) = tokio::runtime::Handle::try_current() {
                rt.spawn(async move {
                    registry.unsubscribe(&handle).await;
                });
            }
        }
    }
}

/// Connector that consumes the HTTP subscribe endpoint
///
/// Issues `GET {base_url}/api/transcripts/sse?room=..&participant=..` and
/// incrementally decodes the event-stream body.
#[derive(Clone)]
pub struct HttpConnector {
    client: reqwest::Client,
    base_url: String,
}

impl HttpConnector {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

impl Connector for HttpConnector {
    type Connection = HttpConnection;

    async fn connect(
        &mut self,
        room: &str,
        participant: &str,
    ) -> Result<Self::Connection, TransportError> {
        let url = format!("{}/api/transcripts/sse", self.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(url)
            .query(&[("room", room), ("participant", participant)])
            .send()
            .await
            .map_err(|e| TransportError::Connect(e.to_string()))?
            .error_for_status()
            .map_err(|e| TransportError::Connect(e.to_string()))?;

        Ok(HttpConnection {
            body: response.bytes_stream().boxed(),
            decoder: crate::protocol::FrameDecoder::new(),
        })
    }
}

/// Open HTTP event-stream subscription
pub struct HttpConnection {
    body: futures_util::stream::BoxStream<'static, reqwest::Result<Bytes>>,
    decoder: crate::protocol::FrameDecoder,
}

impl Connection for HttpConnection {
    async fn next_frame(&mut self) -> Option<Result<Bytes, TransportError>> {
        loop {
            if let Some(frame) = self.decoder.next_frame() {
                return Some(Ok(frame));
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.decoder.feed(&chunk),
                Some(Err(e)) => return Some(Err(TransportError::Stream(e.to_string()))),
                None => return None,
            }
        }
    }
}
