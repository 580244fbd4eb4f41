//! Client stream configuration

use std::time::Duration;

/// Configuration for one transcript stream subscription
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Room to subscribe to
    pub room: String,

    /// Participant name to subscribe as
    pub participant: String,

    /// Whether transport failures trigger automatic reconnects
    pub auto_reconnect: bool,

    /// Fixed delay between reconnect attempts (not exponential)
    pub reconnect_interval: Duration,

    /// Automatic attempts before settling in the terminal error state
    pub max_reconnect_attempts: u32,

    /// Capacity of the event channel handed to the consumer
    pub event_buffer: usize,
}

impl StreamConfig {
    /// Create a config for `(room, participant)` with default retry policy
    pub fn new(room: impl Into<String>, participant: impl Into<String>) -> Self {
        Self {
            room: room.into(),
            participant: participant.into(),
            auto_reconnect: true,
            reconnect_interval: Duration::from_secs(3),
            max_reconnect_attempts: 5,
            event_buffer: 256,
        }
    }

    /// Disable automatic reconnects
    pub fn no_reconnect(mut self) -> Self {
        self.auto_reconnect = false;
        self
    }

    /// Set the fixed reconnect delay
    pub fn reconnect_interval(mut self, interval: Duration) -> Self {
        self.reconnect_interval = interval;
        self
    }

    /// Set the reconnect attempt cap
    pub fn max_reconnect_attempts(mut self, attempts: u32) -> Self {
        self.max_reconnect_attempts = attempts;
        self
    }

    /// Set the consumer event channel capacity
    pub fn event_buffer(mut self, capacity: usize) -> Self {
        self.event_buffer = capacity.max(1);
        self
    }
}
