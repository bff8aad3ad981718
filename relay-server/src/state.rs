//! Application state shared across all request handlers.

use relay_core::events::EventSender;

/// Application state that is shared across all request handlers.
///
/// Cloneable and cheap to pass around.
#[derive(Clone)]
pub struct AppState {
    /// Producer handle for the event queue drained by the delivery loop.
    pub events: EventSender,
}

impl AppState {
    /// Create a new AppState with the given event sender.
    pub fn new(events: EventSender) -> Self {
        Self { events }
    }
}
