//! Configuration module for swapit-feed-server.
//!
//! Handles loading configuration from TOML files, CLI arguments,
//! and environment variables.

pub mod file;
pub mod runtime;

use crate::config::file::{FileConfig, StorageConfig};
use crate::config::runtime::{
    FeedConfig, IngestConfig, ListingSourceConfig, ServerConfig, SharedConfig,
};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("DATABASE_URL environment variable not set")]
    MissingDatabaseUrl,
}

/// Loaded configuration result containing all parts.
pub struct LoadedConfig {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
    pub listing_source: ListingSourceConfig,
    pub feed: FeedConfig,
    /// Only read at startup; changing the backend needs a restart.
    pub storage: StorageConfig,
}

impl LoadedConfig {
    /// Convert the reloadable sections into a SharedConfig.
    pub fn into_shared(self) -> SharedConfig {
        SharedConfig::new(self.ingest, self.listing_source, self.feed)
    }
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: std::path::PathBuf,
    listen_override: Option<SocketAddr>,
}

impl ConfigLoader {
    pub fn new(config_path: impl AsRef<Path>, listen_override: Option<SocketAddr>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
            listen_override,
        }
    }

    /// Read the TOML file, apply CLI overrides, validate and build the
    /// runtime config.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        let config_content = std::fs::read_to_string(&self.config_path)?;
        let mut file_config: FileConfig = toml::from_str(&config_content)?;

        if let Some(listen) = self.listen_override {
            file_config.server.listen = listen;
        }

        validate(&file_config)?;
        Ok(build_loaded_config(file_config))
    }

    /// Reload the configuration (used during SIGHUP).
    pub fn reload(&self) -> Result<LoadedConfig, ConfigError> {
        self.load()
    }
}

fn validate(config: &FileConfig) -> Result<(), ConfigError> {
    if config.ingest.secret.is_empty() {
        return Err(ConfigError::ValidationError(
            "ingest.secret must not be empty".to_owned(),
        ));
    }
    if config.listing_source.timeout_ms == 0 {
        return Err(ConfigError::ValidationError(
            "listing_source.timeout_ms must be positive".to_owned(),
        ));
    }
    if config.feed.default_page_size <= 0 {
        return Err(ConfigError::ValidationError(format!(
            "feed.default_page_size must be positive, got {}",
            config.feed.default_page_size
        )));
    }
    if config.storage.max_connections == 0 {
        return Err(ConfigError::ValidationError(
            "storage.max_connections must be positive".to_owned(),
        ));
    }
    Ok(())
}

fn build_loaded_config(file_config: FileConfig) -> LoadedConfig {
    LoadedConfig {
        server: ServerConfig {
            listen: file_config.server.listen,
        },
        ingest: IngestConfig::new(file_config.ingest.secret.into_bytes().into_boxed_slice()),
        listing_source: ListingSourceConfig {
            base_url: file_config.listing_source.base_url,
            timeout: Duration::from_millis(file_config.listing_source.timeout_ms),
        },
        feed: FeedConfig {
            default_page_size: file_config.feed.default_page_size,
        },
        storage: file_config.storage,
    }
}

/// Get the database URL from the environment.
pub fn get_database_url() -> Result<String, ConfigError> {
    std::env::var("DATABASE_URL").map_err(|_| ConfigError::MissingDatabaseUrl)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml_str: &str) -> FileConfig {
        toml::from_str(toml_str).unwrap()
    }

    const BASE: &str = r#"
[ingest]
secret = "s3cret"

[listing_source]
base_url = "http://listings.internal/"
timeout_ms = 250
"#;

    #[test]
    fn test_build_converts_units() {
        let loaded = build_loaded_config(parse(BASE));
        assert_eq!(loaded.listing_source.timeout, Duration::from_millis(250));
        assert_eq!(loaded.ingest.secret_bytes(), b"s3cret");
        assert_eq!(loaded.feed.default_page_size, 20);
    }

    #[tokio::test]
    async fn test_into_shared_keeps_reloadable_sections() {
        let shared = build_loaded_config(parse(BASE)).into_shared();
        assert_eq!(shared.ingest.read().await.secret_bytes(), b"s3cret");
        assert_eq!(
            shared.listing_source.read().await.timeout,
            Duration::from_millis(250)
        );
        assert_eq!(shared.feed.read().await.default_page_size, 20);
    }

    #[test]
    fn test_empty_secret_is_rejected() {
        let config = parse(&BASE.replace("s3cret", ""));
        assert!(matches!(
            validate(&config),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let config = parse(&BASE.replace("250", "0"));
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_listen_override() {
        let dir = std::env::temp_dir().join(format!("swapit-feed-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("swapit-feed.toml");
        std::fs::write(&path, BASE).unwrap();

        let listen: SocketAddr = "127.0.0.1:9999".parse().unwrap();
        let loaded = ConfigLoader::new(&path, Some(listen)).load().unwrap();
        assert_eq!(loaded.server.listen, listen);

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
