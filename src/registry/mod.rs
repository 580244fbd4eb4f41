//! Room registry for transcript fan-out
//!
//! The registry is the server side's single shared mutable resource: it maps
//! each room to its set of subscribers and routes every published event to
//! all of them.
//!
//! # Architecture
//!
//! ```text
//!                        Arc<RoomRegistry>
//!                  ┌───────────────────────────┐
//!                  │ rooms: HashMap<Room,      │
//!                  │   HashMap<ConnId, Entry { │
//!                  │     sink: mpsc::Sender,   │
//!                  │   }>                      │
//!                  │ >                         │
//!                  └────────────┬──────────────┘
//!                               │
//!        ┌──────────────────────┼──────────────────────┐
//!        │                      │                      │
//!        ▼                      ▼                      ▼
//!   [Agent worker]        [Subscriber]           [Subscriber]
//!   publish_transcript()  sink_rx.recv()         sink_rx.recv()
//!        │                      │                      │
//!        └──► registry.publish()──► SSE body ──► viewer│
//! ```
//!
//! Payloads are `bytes::Bytes`, so fanning one event out to many sinks only
//! bumps a reference count. Delivery is fire-and-forget: a sink that cannot
//! accept a frame is evicted, and a room whose last subscriber leaves is
//! removed immediately.

pub mod config;
pub mod handle;
pub mod store;

pub use config::RegistryConfig;
pub use handle::SubscriberHandle;
pub use store::{ConnectionInfo, RoomRegistry};
