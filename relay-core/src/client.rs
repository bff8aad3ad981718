//! Analytics client identity.

/// Identifiers stamped on every outbound payload.
///
/// Established once at process start and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Anonymous client identifier (`cid`).
    pub client_id: String,
    /// Tracking identifier of the analytics property (`tid`).
    pub tracking_id: String,
    /// Reported application name (`an`).
    pub app_name: String,
    /// Reported application version (`av`).
    pub app_version: String,
}

impl ClientConfig {
    /// Create a new client configuration.
    pub fn new(
        client_id: impl Into<String>,
        tracking_id: impl Into<String>,
        app_name: impl Into<String>,
        app_version: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            tracking_id: tracking_id.into(),
            app_name: app_name.into(),
            app_version: app_version.into(),
        }
    }
}
