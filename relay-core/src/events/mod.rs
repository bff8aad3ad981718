//! Event types and channel infrastructure.
//!
//! Events flow through a single bounded queue: request handlers enqueue
//! them (many producers), and the delivery loop drains them (one
//! consumer). Events are ephemeral - they live only in this queue and are
//! dropped on process exit.

pub mod channels;
pub mod types;

pub use channels::{EVENT_CHANNEL_BUFFER, EventReceiver, EventSender, event_channel};
pub use types::Event;
