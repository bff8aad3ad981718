//! TOML file configuration structures.
//!
//! These structs directly map to the `relay-config.toml` file format.

use relay_core::processors::DEFAULT_COLLECT_URL;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use url::Url;

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub server: ServerConfig,
    pub analytics: AnalyticsConfig,
}

/// Server configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The address and port to listen on (e.g., "0.0.0.0:8080").
    #[serde(default = "default_listen_addr")]
    pub listen: SocketAddr,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen_addr(),
        }
    }
}

fn default_listen_addr() -> SocketAddr {
    "0.0.0.0:8080".parse().expect("valid default address")
}

/// Analytics configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    /// Tracking identifier of the analytics property (e.g. "UA-139317174-1").
    pub tracking_id: String,
    /// Client identifier stamped on every payload.
    /// Generated at startup when absent.
    #[serde(default)]
    pub client_id: Option<String>,
    /// Application name reported with every event.
    #[serde(default = "default_app_name")]
    pub app_name: String,
    /// Application version reported with every event.
    #[serde(default = "default_app_version")]
    pub app_version: String,
    /// Collection endpoint of the sink.
    #[serde(default = "default_collect_url")]
    pub collect_url: Url,
}

fn default_app_name() -> String {
    "relay".to_string()
}

fn default_app_version() -> String {
    "1".to_string()
}

fn default_collect_url() -> Url {
    DEFAULT_COLLECT_URL.parse().expect("valid default collect url")
}
