//! Configuration module for relay-server.
//!
//! Handles loading configuration from a TOML file with CLI overrides, and
//! derives the immutable reporting identity used by the delivery loop.

pub mod file;

use crate::config::file::{FileConfig, ServerConfig};
use relay_core::client::ClientConfig;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub client: ClientConfig,
    pub collect_url: Url,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Load and process the configuration.
    ///
    /// This will:
    /// 1. Read the TOML file
    /// 2. Apply CLI overrides
    /// 3. Validate the configuration
    /// 4. Generate a client identifier if none is configured
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        self.validate(&file_config)?;

        Ok(build_loaded_config(file_config))
    }

    fn validate(&self, config: &FileConfig) -> Result<(), ConfigError> {
        if config.analytics.tracking_id.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "analytics.tracking_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    let analytics = file_config.analytics;
    let client_id = analytics
        .client_id
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    LoadedConfig {
        server: file_config.server,
        client: ClientConfig::new(
            client_id,
            analytics.tracking_id,
            analytics.app_name,
            analytics.app_version,
        ),
        collect_url: analytics.collect_url,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    #[test]
    fn empty_tracking_id_is_rejected() {
        let loader = ConfigLoader::new("unused", None);
        let config = parse(
            r#"
[analytics]
tracking_id = "  "
"#,
        );
        assert!(matches!(
            loader.validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn client_id_is_generated_when_absent() {
        let config = parse(
            r#"
[analytics]
tracking_id = "UA-1"
"#,
        );
        let loaded = build_loaded_config(config);
        assert!(!loaded.client.client_id.is_empty());
        assert!(Uuid::parse_str(&loaded.client.client_id).is_ok());
    }

    #[test]
    fn configured_client_id_is_preserved() {
        let config = parse(
            r#"
[analytics]
tracking_id = "UA-1"
client_id = "fixed-cid"
"#,
        );
        let loaded = build_loaded_config(config);
        assert_eq!(loaded.client.client_id, "fixed-cid");
        assert_eq!(loaded.client.tracking_id, "UA-1");
    }
}
