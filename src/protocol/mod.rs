//! Wire protocol for transcript streaming
//!
//! Defines the event types, the tagged JSON message unions for both
//! directions, and the event-stream framing used on the subscribe endpoint.
//!
//! Registry sinks carry bare JSON payloads; the `data: <JSON>\n\n` framing is
//! an HTTP-boundary concern handled by [`sse`].

pub mod event;
pub mod message;
pub mod sse;

pub use event::{now_ms, ConnectionState, TranscriptEvent, WordTimestamp};
pub use message::{ClientMessage, ParseError, ServerEvent, ServerResponse};
pub use sse::{encode_frame, FrameDecoder};
