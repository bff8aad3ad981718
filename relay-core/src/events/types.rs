//! Event type definitions.

use serde::Deserialize;

/// An event reported by an application installation.
///
/// Carries no identity beyond its field values and is never persisted:
/// an event is consumed exactly once by the delivery loop, or lost if the
/// process exits first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Event {
    /// What the user did (e.g. "click").
    pub action: String,
    /// The group the action belongs to (e.g. "button").
    pub category: String,
    /// Identifier of the user who performed the action.
    pub user: String,
}
