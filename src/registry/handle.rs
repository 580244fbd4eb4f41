//! Subscriber handle and per-subscriber sink record

use bytes::Bytes;
use tokio::sync::mpsc;

/// Identity of one registered subscriber
///
/// Returned from [`RoomRegistry::subscribe`](super::RoomRegistry::subscribe)
/// and passed back to `unsubscribe`. Connection ids are process-unique and
/// monotonic.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriberHandle {
    /// Room this subscriber belongs to
    pub room: String,
    /// Participant name supplied at subscribe time
    pub participant: String,
    /// Unique, monotonically allocated connection id
    pub connection_id: u64,
}

impl std::fmt::Display for SubscriberHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.room, self.participant, self.connection_id)
    }
}

/// Registry-internal record for one subscriber
///
/// Owns the sending half of the sink. Dropping it (on eviction or
/// unsubscribe) ends the subscriber's receive stream, which doubles as the
/// abort signal for whatever task is serving that subscriber.
#[derive(Debug)]
pub(super) struct SubscriberEntry {
    pub(super) participant: String,
    pub(super) sink: mpsc::Sender<Bytes>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_display() {
        let handle = SubscriberHandle {
            room: "studio".to_string(),
            participant: "viewer".to_string(),
            connection_id: 7,
        };
        assert_eq!(handle.to_string(), "studio:viewer:7");
    }
}
