//! Client-side stream transport
//!
//! Maintains one logical subscription per `(room, participant)`: a
//! reconnecting consumer of the server's event stream that delivers ordered
//! events to a single receiver. Failures surface as connection state, never
//! as panics or errors thrown across the consumer boundary.

pub mod config;
pub mod connector;
pub mod error;
pub mod stream;

pub use config::StreamConfig;
pub use connector::{Connection, Connector, HttpConnector, LocalConnector};
pub use error::TransportError;
pub use stream::{StreamEvent, TranscriptStream};
