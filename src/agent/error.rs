//! Agent worker errors

use std::fmt;

/// Errors from the agent worker lifecycle
#[derive(Debug)]
pub enum AgentError {
    /// The worker configuration is unusable
    InvalidConfig(&'static str),

    /// `start()` was called while the worker is already running
    AlreadyRunning,

    /// `stop()` was called while the worker is not running
    NotRunning,

    /// The speech source failed
    Source(String),
}

impl fmt::Display for AgentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AgentError::InvalidConfig(reason) => write!(f, "invalid agent config: {}", reason),
            AgentError::AlreadyRunning => write!(f, "agent worker is already running"),
            AgentError::NotRunning => write!(f, "agent worker is not running"),
            AgentError::Source(reason) => write!(f, "speech source failed: {}", reason),
        }
    }
}

impl std::error::Error for AgentError {}
