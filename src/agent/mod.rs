//! Publishing agent
//!
//! The producing side of a room: a worker that drains a speech source and
//! publishes each transcript through the registry. Owned explicitly by the
//! embedding application; there is no global agent.

pub mod error;
pub mod source;
pub mod worker;

pub use error::AgentError;
pub use source::{ChannelSource, SpeechSource};
pub use worker::{AgentConfig, AgentEvent, AgentState, AgentWorker};
