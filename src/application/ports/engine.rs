//! Engine port interfaces
//!
//! The engine is the background process that owns audio capture, speech
//! recognition, enhancement, OS-level hotkeys and key polling. It is the
//! single source of truth for pipeline state; everything here is a request
//! that suspends until the engine replies.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::capture::{CaptureTransport, KeyEvent};
use crate::domain::pipeline::{PipelineConfig, PipelineResult, PipelineState};
use crate::domain::shortcut::ShortcutBinding;

/// Engine call errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// The engine refused the request (e.g. start while already running)
    #[error("{0}")]
    Rejected(String),

    /// The engine accepted the request but the operation failed
    #[error("{0}")]
    Failed(String),

    /// The operation needs an OS permission the engine does not have
    #[error("Permission required: {0}")]
    PermissionDenied(String),

    /// The engine could not be reached
    #[error("Engine unreachable: {0}")]
    Transport(String),

    /// The engine replied with something we could not understand
    #[error("Unexpected engine reply: {0}")]
    Protocol(String),
}

impl EngineError {
    /// Raw message without the category prefix
    pub fn message(&self) -> &str {
        match self {
            Self::Rejected(m)
            | Self::Failed(m)
            | Self::PermissionDenied(m)
            | Self::Transport(m)
            | Self::Protocol(m) => m,
        }
    }
}

/// Recording pipeline requests
#[async_trait]
pub trait PipelineEngine: Send + Sync {
    /// Begin recording. Returns the path of the audio file being written.
    async fn start_recording(&self) -> Result<String, EngineError>;

    /// Stop recording and run transcription, filtering, enhancement and output.
    async fn stop_and_process(&self, config: &PipelineConfig)
        -> Result<PipelineResult, EngineError>;

    /// Abort whatever is in flight
    async fn cancel(&self) -> Result<(), EngineError>;

    async fn is_running(&self) -> Result<bool, EngineError>;

    async fn current_state(&self) -> Result<PipelineState, EngineError>;

    /// Run the processing chain over a pre-recorded audio file
    async fn transcribe_file(
        &self,
        path: &Path,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, EngineError>;
}

/// Key capture requests
#[async_trait]
pub trait CaptureEngine: Send + Sync {
    /// Start capturing. The engine picks the transport.
    async fn enter_capture_mode(&self) -> Result<CaptureTransport, EngineError>;

    async fn exit_capture_mode(&self) -> Result<(), EngineError>;

    /// Forward one key transition (fallback transport only)
    async fn report_key_event(&self, event: &KeyEvent) -> Result<(), EngineError>;

    /// Whether the engine may observe global key state
    async fn check_input_monitoring(&self) -> Result<bool, EngineError>;

    /// Open the system prompt that grants input monitoring
    async fn request_input_monitoring(&self) -> Result<(), EngineError>;
}

/// Global hotkey registration requests
#[async_trait]
pub trait ShortcutEngine: Send + Sync {
    async fn register_shortcut(&self, binding: &ShortcutBinding) -> Result<(), EngineError>;

    async fn unregister_shortcut(&self, id: &str) -> Result<(), EngineError>;

    async fn unregister_all_shortcuts(&self) -> Result<(), EngineError>;

    async fn list_registered_shortcuts(&self) -> Result<Vec<ShortcutBinding>, EngineError>;
}

#[async_trait]
impl<T: PipelineEngine + ?Sized> PipelineEngine for Arc<T> {
    async fn start_recording(&self) -> Result<String, EngineError> {
        self.as_ref().start_recording().await
    }

    async fn stop_and_process(
        &self,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, EngineError> {
        self.as_ref().stop_and_process(config).await
    }

    async fn cancel(&self) -> Result<(), EngineError> {
        self.as_ref().cancel().await
    }

    async fn is_running(&self) -> Result<bool, EngineError> {
        self.as_ref().is_running().await
    }

    async fn current_state(&self) -> Result<PipelineState, EngineError> {
        self.as_ref().current_state().await
    }

    async fn transcribe_file(
        &self,
        path: &Path,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, EngineError> {
        self.as_ref().transcribe_file(path, config).await
    }
}

#[async_trait]
impl<T: CaptureEngine + ?Sized> CaptureEngine for Arc<T> {
    async fn enter_capture_mode(&self) -> Result<CaptureTransport, EngineError> {
        self.as_ref().enter_capture_mode().await
    }

    async fn exit_capture_mode(&self) -> Result<(), EngineError> {
        self.as_ref().exit_capture_mode().await
    }

    async fn report_key_event(&self, event: &KeyEvent) -> Result<(), EngineError> {
        self.as_ref().report_key_event(event).await
    }

    async fn check_input_monitoring(&self) -> Result<bool, EngineError> {
        self.as_ref().check_input_monitoring().await
    }

    async fn request_input_monitoring(&self) -> Result<(), EngineError> {
        self.as_ref().request_input_monitoring().await
    }
}

#[async_trait]
impl<T: ShortcutEngine + ?Sized> ShortcutEngine for Arc<T> {
    async fn register_shortcut(&self, binding: &ShortcutBinding) -> Result<(), EngineError> {
        self.as_ref().register_shortcut(binding).await
    }

    async fn unregister_shortcut(&self, id: &str) -> Result<(), EngineError> {
        self.as_ref().unregister_shortcut(id).await
    }

    async fn unregister_all_shortcuts(&self) -> Result<(), EngineError> {
        self.as_ref().unregister_all_shortcuts().await
    }

    async fn list_registered_shortcuts(&self) -> Result<Vec<ShortcutBinding>, EngineError> {
        self.as_ref().list_registered_shortcuts().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_and_failed_display_raw_message() {
        assert_eq!(
            EngineError::Rejected("Pipeline is already running".into()).to_string(),
            "Pipeline is already running"
        );
        assert_eq!(EngineError::Failed("No speech".into()).to_string(), "No speech");
    }

    #[test]
    fn message_strips_category() {
        let err = EngineError::Transport("connection refused".into());
        assert!(err.to_string().starts_with("Engine unreachable"));
        assert_eq!(err.message(), "connection refused");
    }
}
