//! Configuration port interface

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;

/// Port for configuration storage
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Load configuration from storage.
    ///
    /// # Returns
    /// The loaded config (may have None fields if file doesn't exist)
    async fn load(&self) -> Result<AppConfig, ConfigError>;

    /// Save configuration to storage.
    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError>;

    /// Get the configuration file path.
    fn path(&self) -> PathBuf;

    /// Check if configuration file exists.
    fn exists(&self) -> bool;

    /// Initialize configuration file with defaults.
    /// Fails if file already exists.
    async fn init(&self) -> Result<(), ConfigError>;
}

/// Shared stores are read by the controller and written by capture
#[async_trait]
impl<T: ConfigStore + ?Sized> ConfigStore for Arc<T> {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        self.as_ref().load().await
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        self.as_ref().save(config).await
    }

    fn path(&self) -> PathBuf {
        self.as_ref().path()
    }

    fn exists(&self) -> bool {
        self.as_ref().exists()
    }

    async fn init(&self) -> Result<(), ConfigError> {
        self.as_ref().init().await
    }
}
