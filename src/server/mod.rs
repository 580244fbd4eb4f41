//! Transcript server
//!
//! Hosts the registry behind HTTP: an event-stream subscribe route, a
//! WebSocket control route, and a status endpoint. The registry itself is
//! shared with whatever publishes into it, typically an
//! [`AgentWorker`](crate::agent::AgentWorker) in the same process.

pub mod config;
pub mod http;
pub mod session;

pub use config::ServerConfig;
pub use http::{router, serve, serve_until};
pub use session::{ControlSession, SessionReply};
