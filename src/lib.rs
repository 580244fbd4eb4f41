//! Live transcript delivery and speech-to-script alignment
//!
//! Building blocks for teleprompter-style applications: a speaking
//! participant's transcription results are fanned out to every viewer of a
//! room, and a prepared script tracks where in the text the speaker
//! currently is.
//!
//! - [`protocol`]: wire types, tagged JSON envelopes, event-stream framing
//! - [`registry`]: server-side room fan-out
//! - [`agent`]: the publishing worker that feeds a room from a speech source
//! - [`server`]: HTTP host exposing the subscribe and control routes
//! - [`transport`]: reconnecting client-side stream
//! - [`align`]: sentence segmentation, matching, and the reading cursor
//!
//! # Serving a room
//! ```no_run
//! use std::sync::Arc;
//! use teleprompt_rs::registry::RoomRegistry;
//! use teleprompt_rs::server::{self, ServerConfig};
//!
//! # async fn run() -> teleprompt_rs::Result<()> {
//! let registry = Arc::new(RoomRegistry::new());
//! server::serve(ServerConfig::default(), registry).await
//! # }
//! ```
//!
//! # Following a script
//! ```
//! use teleprompt_rs::align::ScriptFollower;
//! use teleprompt_rs::protocol::TranscriptEvent;
//!
//! let mut follower = ScriptFollower::new("Hello there. How are you today?");
//! let event = TranscriptEvent::final_text("hello there", "host");
//! assert_eq!(follower.on_transcript(&event), Some(1));
//! ```

pub mod agent;
pub mod align;
pub mod error;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod transport;

pub use error::{Error, Result};
