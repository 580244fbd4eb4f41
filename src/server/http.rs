//! HTTP host
//!
//! Exposes the registry over two routes plus a diagnostic endpoint:
//!
//! - `GET /api/transcripts/sse?room=..&participant=..` streams the room's
//!   events as `data: <JSON>\n\n` frames until the client disconnects
//! - `GET /api/transcripts/ws` upgrades to a WebSocket carrying the
//!   bidirectional control protocol, with raw JSON payloads interleaved
//! - `GET /api/transcripts/status` returns the registry occupancy snapshot
//!
//! Client disconnects unsubscribe promptly, so rooms are GC'd as soon as the
//! last viewer goes away rather than on the next publish.

use std::convert::Infallible;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::body::Body;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use bytes::Bytes;
use futures_util::Stream;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::protocol::encode_frame;
use crate::registry::{RoomRegistry, SubscriberHandle};
use crate::server::config::ServerConfig;
use crate::server::session::{ControlSession, SessionReply};

#[derive(Clone)]
struct AppState {
    registry: Arc<RoomRegistry>,
    config: ServerConfig,
}

/// Build the transcript router over a shared registry.
pub fn router(registry: Arc<RoomRegistry>, config: ServerConfig) -> Router {
    let state = AppState { registry, config };

    Router::new()
        .route("/api/transcripts/sse", get(sse_handler))
        .route("/api/transcripts/ws", get(ws_handler))
        .route("/api/transcripts/status", get(status_handler))
        .with_state(state)
}

/// Run the server.
///
/// This method blocks until the server is shut down.
pub async fn serve(config: ServerConfig, registry: Arc<RoomRegistry>) -> Result<()> {
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Transcript server listening");

    axum::serve(listener, router(registry, config)).await?;
    Ok(())
}

/// Run the server with graceful shutdown.
pub async fn serve_until<F>(
    config: ServerConfig,
    registry: Arc<RoomRegistry>,
    shutdown: F,
) -> Result<()>
where
    F: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "Transcript server listening");

    axum::serve(listener, router(registry, config))
        .with_graceful_shutdown(async {
            shutdown.await;
            tracing::info!("Shutdown signal received");
        })
        .await?;
    Ok(())
}

#[derive(Debug, serde::Deserialize)]
struct SubscribeQuery {
    room: Option<String>,
    participant: Option<String>,
}

async fn sse_handler(
    State(state): State<AppState>,
    Query(query): Query<SubscribeQuery>,
) -> Response {
    let Some(room) = query.room.filter(|r| !r.is_empty()) else {
        return (StatusCode::BAD_REQUEST, "missing 'room' query parameter").into_response();
    };
    let Some(participant) = query.participant.filter(|p| !p.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            "missing 'participant' query parameter",
        )
            .into_response();
    };

    let (handle, rx) = state.registry.subscribe(&room, &participant).await;

    let stream = SubscriberStream {
        registry: Arc::clone(&state.registry),
        handle: Some(handle),
        rx,
    };

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

async fn ws_handler(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| {
        handle_control_socket(socket, state.registry, state.config.default_participant)
    })
}

async fn status_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.registry.connection_info().await)
}

/// Registry sink wrapped as a framed body stream.
///
/// Dropping it (the client went away) releases the subscription.
struct SubscriberStream {
    registry: Arc<RoomRegistry>,
    handle: Option<SubscriberHandle>,
    rx: mpsc::Receiver<Bytes>,
}

impl Stream for SubscriberStream {
    type Item = std::result::Result<Bytes, Infallible>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.get_mut()
            .rx
            .poll_recv(cx)
            .map(|payload| payload.map(|p| Ok(encode_frame(&p))))
    }
}

impl Drop for SubscriberStream {
    fn drop(&mut self) {
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

/// Drive one WebSocket control session until the client goes away.
///
/// Control responses and fanned-out payloads are interleaved on the same
/// socket; raw JSON payloads go out exactly as published, without SSE
/// framing.
async fn handle_control_socket(
    mut socket: WebSocket,
    registry: Arc<RoomRegistry>,
    default_participant: String,
) {
    let mut session = ControlSession::new(registry, default_participant);
    let mut frames: Option<mpsc::Receiver<Bytes>> = None;

    loop {
        tokio::select! {
            message = socket.recv() => {
                match message {
                    Some(Ok(Message::Text(text))) => {
                        let reply = session.handle_text(&text).await;
                        let response = reply.response().encode();

                        if let SessionReply::Subscribed { frames: rx, .. } = reply {
                            frames = Some(rx);
                        }
                        if socket.send(Message::Text(response.into())).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {} // binary and pings are not part of the protocol
                    Some(Err(e)) => {
                        tracing::debug!(error = %e, "Control socket error");
                        break;
                    }
                }
            }
            payload = next_payload(&mut frames) => {
                match payload {
                    Some(payload) => {
                        let text = String::from_utf8_lossy(&payload).into_owned();
                        if socket.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    // Sink closed: the subscriber was evicted.
                    None => frames = None,
                }
            }
        }
    }

    session.close().await;
}

async fn next_payload(frames: &mut Option<mpsc::Receiver<Bytes>>) -> Option<Bytes> {
    match frames {
        Some(rx) => rx.recv().await,
        None => std::future::pending().await,
    }
}
