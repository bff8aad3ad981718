//! Event channel factory and handles.

use super::types::Event;
use tokio::sync::mpsc;

/// Buffer size for the event channel.
///
/// Small on purpose: once the buffer is full, `send` suspends the
/// submitting request handler until the delivery loop frees a slot.
/// Backpressure reaches the producer as latency, never as a drop.
pub const EVENT_CHANNEL_BUFFER: usize = 10;

/// Sender handle for the event queue.
pub type EventSender = mpsc::Sender<Event>;
/// Receiver handle for the event queue.
pub type EventReceiver = mpsc::Receiver<Event>;

/// Create a new event channel.
///
/// Returns a (sender, receiver) pair. The sender may be cloned freely for
/// concurrent producers; the receiver must stay with the single delivery
/// loop.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::channel(EVENT_CHANNEL_BUFFER)
}
