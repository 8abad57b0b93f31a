//! Shared plumbing for command runners

use std::env;

use thiserror::Error;

use crate::application::ports::{ConfigStore, EngineError};
use crate::application::{CaptureError, PipelineError};
use crate::domain::config::AppConfig;
use crate::domain::error::{AcceleratorError, ConfigError};
use crate::infrastructure::{SocketEngine, SocketPath, XdgConfigStore};

/// Exit codes
pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_ERROR: u8 = 1;
pub const EXIT_USAGE_ERROR: u8 = 2;

/// Environment variable overriding the engine socket
pub const SOCKET_ENV: &str = "HOTSCRIBE_ENGINE_SOCKET";

/// Failure of one CLI command
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Accelerator(#[from] AcceleratorError),

    /// Bad input the user can fix by changing the command line
    #[error("{0}")]
    Usage(String),

    #[error("{0}")]
    Failed(String),
}

impl CliError {
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE_ERROR,
            _ => EXIT_ERROR,
        }
    }

    /// Extra line shown under the error, if any
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::Engine(EngineError::Transport(_))
            | Self::Pipeline(PipelineError::Engine(EngineError::Transport(_))) => Some(
                "Is the speech engine running? Point at its socket with --socket or HOTSCRIBE_ENGINE_SOCKET",
            ),
            _ => None,
        }
    }
}

/// Load and merge configuration from file, env, and CLI
pub async fn load_merged_config<S: ConfigStore>(store: &S, cli_config: AppConfig) -> AppConfig {
    let file_config = store.load().await.unwrap_or_else(|e| {
        tracing::warn!("Ignoring unreadable config: {e}");
        AppConfig::empty()
    });

    let env_config = AppConfig {
        engine_socket: env::var(SOCKET_ENV).ok().filter(|s| !s.is_empty()),
        ..Default::default()
    };

    // Merge: defaults < file < env < cli
    AppConfig::defaults()
        .merge(file_config)
        .merge(env_config)
        .merge(cli_config)
}

/// Same as [`load_merged_config`] against the default config file
pub async fn load_default_config(cli_config: AppConfig) -> AppConfig {
    load_merged_config(&XdgConfigStore::new(), cli_config).await
}

/// Engine client for the socket the merged config points at
pub fn connect_engine(config: &AppConfig) -> SocketEngine {
    SocketEngine::new(SocketPath::resolve(config.engine_socket.as_deref()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usage_errors_exit_with_two() {
        assert_eq!(CliError::Usage("bad".into()).exit_code(), EXIT_USAGE_ERROR);
        assert_eq!(CliError::Failed("boom".into()).exit_code(), EXIT_ERROR);
        assert_eq!(
            CliError::Engine(EngineError::Rejected("busy".into())).exit_code(),
            EXIT_ERROR
        );
    }

    #[test]
    fn transport_errors_carry_a_hint() {
        let err = CliError::from(EngineError::Transport("connection refused".into()));
        assert!(err.hint().is_some());
        assert!(CliError::Failed("x".into()).hint().is_none());
    }

    #[tokio::test]
    async fn cli_socket_beats_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = XdgConfigStore::with_path(dir.path().join("config.toml"));
        store
            .save(&AppConfig {
                engine_socket: Some("/from/file.sock".into()),
                notify: Some(true),
                ..Default::default()
            })
            .await
            .unwrap();

        let config = load_merged_config(
            &store,
            AppConfig {
                engine_socket: Some("/from/cli.sock".into()),
                ..Default::default()
            },
        )
        .await;
        assert_eq!(config.engine_socket.as_deref(), Some("/from/cli.sock"));
        assert_eq!(config.notify, Some(true));
        assert_eq!(config.play_sounds, Some(true));
    }
}
