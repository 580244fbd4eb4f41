//! Transport error types

/// Error type for the client stream transport
///
/// All variants are handled inside the stream driver and surfaced to the
/// consumer as connection state plus a last-error string; they never cross
/// the event channel as panics.
#[derive(Debug, Clone)]
pub enum TransportError {
    /// Room or participant was missing or empty; rejected before any
    /// connection attempt
    InvalidSubscription(&'static str),
    /// The connection could not be opened
    Connect(String),
    /// An open connection was dropped mid-stream
    Stream(String),
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::InvalidSubscription(what) => {
                write!(f, "invalid subscription: {}", what)
            }
            TransportError::Connect(reason) => write!(f, "connect failed: {}", reason),
            TransportError::Stream(reason) => write!(f, "stream error: {}", reason),
        }
    }
}

impl std::error::Error for TransportError {}
