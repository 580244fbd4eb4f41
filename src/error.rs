//! Crate-level error type

use std::fmt;

use crate::agent::AgentError;
use crate::protocol::ParseError;
use crate::transport::TransportError;

/// Convenience result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error wrapping the module errors
#[derive(Debug)]
pub enum Error {
    /// Client transport failure
    Transport(TransportError),

    /// Wire frame could not be decoded
    Parse(ParseError),

    /// Agent worker lifecycle failure
    Agent(AgentError),

    /// Underlying I/O failure
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Transport(e) => write!(f, "transport error: {}", e),
            Error::Parse(e) => write!(f, "parse error: {}", e),
            Error::Agent(e) => write!(f, "agent error: {}", e),
            Error::Io(e) => write!(f, "io error: {}", e),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Transport(e) => Some(e),
            Error::Parse(e) => Some(e),
            Error::Agent(e) => Some(e),
            Error::Io(e) => Some(e),
        }
    }
}

impl From<TransportError> for Error {
    fn from(e: TransportError) -> Self {
        Error::Transport(e)
    }
}

impl From<ParseError> for Error {
    fn from(e: ParseError) -> Self {
        Error::Parse(e)
    }
}

impl From<AgentError> for Error {
    fn from(e: AgentError) -> Self {
        Error::Agent(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
