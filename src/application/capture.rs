//! Shortcut capture use case
//!
//! Lets the user record a new accelerator for one binding. Every binding is
//! taken offline while capturing so none of them can fire mid-capture.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::ports::{CaptureEngine, ConfigStore, EngineError, ShortcutEngine};
use super::shortcuts::ShortcutRegistry;
use crate::domain::capture::{CaptureSession, CaptureTransport, KeyCapture, KeyEvent};
use crate::domain::error::ConfigError;
use crate::domain::shortcut::{
    default_bindings, shortcut_ids, RegistrationResult, ShortcutBinding, ShortcutConflict,
};

/// Shown when the engine lacks input monitoring permission
pub const PERMISSION_REMEDIATION: &str = "Input monitoring permission is required to capture \
shortcuts. Grant it in your system privacy settings, or run `hotscribe shortcuts capture` \
with `--request-permission` to open the prompt.";

/// Errors from the capture sub-machine
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("A shortcut capture is already in progress")]
    AlreadyCapturing,

    #[error("No shortcut capture in progress")]
    NotCapturing,

    #[error("Unknown shortcut: {0}")]
    UnknownBinding(String),

    #[error("{message}")]
    PermissionRequired { message: String },

    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What happened to one locally observed key event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDisposition {
    /// A bare modifier updated the pending-keys preview
    Preview(Vec<String>),
    /// Forwarded to the engine (fallback transport)
    Forwarded,
    /// The engine reads keys itself (privileged transport)
    Ignored,
    /// Escape: capture ended without applying anything
    Cancelled,
}

/// How a capture session ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// The new accelerator is registered. `saved` is false if persisting it failed.
    Applied {
        shortcut_id: String,
        accelerator: String,
        saved: bool,
    },
    /// The new accelerator could not be registered; the old one was put back
    Conflict(ShortcutConflict),
    /// The engine finished without a usable combination
    Invalid { keys: Vec<String> },
    Cancelled,
}

/// Capture sub-machine: `inactive -> capturing -> inactive`
pub struct ShortcutCapture<C, R, S>
where
    C: CaptureEngine,
    R: ShortcutEngine,
    S: ConfigStore,
{
    engine: C,
    registry: Arc<ShortcutRegistry<R>>,
    settings: S,
    session: Mutex<Option<CaptureSession>>,
}

impl<C, R, S> ShortcutCapture<C, R, S>
where
    C: CaptureEngine,
    R: ShortcutEngine,
    S: ConfigStore,
{
    pub fn new(engine: C, registry: Arc<ShortcutRegistry<R>>, settings: S) -> Self {
        Self {
            engine,
            registry,
            settings,
            session: Mutex::new(None),
        }
    }

    pub async fn is_active(&self) -> bool {
        self.session.lock().await.is_some()
    }

    /// Id of the binding being edited
    pub async fn binding_id(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.binding_id().to_string())
    }

    pub async fn transport(&self) -> Option<CaptureTransport> {
        self.session.lock().await.as_ref().map(CaptureSession::transport)
    }

    /// Keys currently shown as pending
    pub async fn preview(&self) -> Vec<String> {
        self.session
            .lock()
            .await
            .as_ref()
            .map(|s| s.held_keys().to_vec())
            .unwrap_or_default()
    }

    /// Start capturing a new accelerator for `binding_id`.
    ///
    /// Suspends every registered binding first. If the engine refuses capture
    /// mode the suspended bindings are restored before returning.
    pub async fn enter(&self, binding_id: &str) -> Result<CaptureTransport, CaptureError> {
        let mut session = self.session.lock().await;
        if session.is_some() {
            return Err(CaptureError::AlreadyCapturing);
        }

        let original = self.registry.binding(binding_id).await;
        if original.is_none() && !shortcut_ids::ALL.contains(&binding_id) {
            return Err(CaptureError::UnknownBinding(binding_id.to_string()));
        }

        let suspended = self.registry.suspend_all().await;
        match self.engine.enter_capture_mode().await {
            Ok(transport) => {
                info!(id = binding_id, %transport, "Shortcut capture started");
                *session = Some(CaptureSession::new(binding_id, transport, suspended, original));
                Ok(transport)
            }
            Err(e) => {
                warn!("Engine refused capture mode: {e}");
                self.registry.restore(&suspended).await;
                Err(match e {
                    EngineError::PermissionDenied(detail) => {
                        debug!("Permission detail: {detail}");
                        CaptureError::PermissionRequired {
                            message: PERMISSION_REMEDIATION.to_string(),
                        }
                    }
                    other => other.into(),
                })
            }
        }
    }

    /// Handle a key-down observed by our own input
    pub async fn key_down(&self, event: &KeyEvent) -> Result<KeyDisposition, CaptureError> {
        if event.is_escape() {
            self.cancel().await?;
            return Ok(KeyDisposition::Cancelled);
        }

        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(CaptureError::NotCapturing)?;
        if let Some(label) = event.modifier_label() {
            session.press_modifier(label);
            return Ok(KeyDisposition::Preview(session.held_keys().to_vec()));
        }

        if !session.transport().forwards_keys() {
            return Ok(KeyDisposition::Ignored);
        }

        debug!(key = %event.key, code = %event.code, "Forwarding key to engine");
        self.engine.report_key_event(event).await?;
        Ok(KeyDisposition::Forwarded)
    }

    /// Handle a key-up observed by our own input. Only the preview changes.
    pub async fn key_up(&self, event: &KeyEvent) -> Result<KeyDisposition, CaptureError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(CaptureError::NotCapturing)?;
        match event.modifier_label() {
            Some(label) => {
                session.release_modifier(label);
                Ok(KeyDisposition::Preview(session.held_keys().to_vec()))
            }
            None => Ok(KeyDisposition::Ignored),
        }
    }

    /// Losing input focus ends capture like Escape
    pub async fn blur(&self) -> Result<CaptureOutcome, CaptureError> {
        self.cancel().await
    }

    /// Apply an engine `key-capture-update`. Returns the new preview.
    pub async fn handle_update(&self, update: &KeyCapture) -> Option<Vec<String>> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut()?;
        session.set_preview(update.keys.clone());
        Some(update.keys.clone())
    }

    /// Apply the engine's terminal `key-capture-complete` and leave capture.
    ///
    /// A valid combination is registered for the edited binding and persisted
    /// before the other bindings come back online.
    pub async fn handle_complete(
        &self,
        complete: &KeyCapture,
    ) -> Result<CaptureOutcome, CaptureError> {
        let session = self
            .session
            .lock()
            .await
            .take()
            .ok_or(CaptureError::NotCapturing)?;
        let id = session.binding_id().to_string();

        if !complete.is_valid || complete.accelerator.trim().is_empty() {
            info!(id, keys = ?complete.keys, "Capture finished without a valid shortcut");
            self.finish(session.suspended()).await;
            return Ok(CaptureOutcome::Invalid {
                keys: complete.keys.clone(),
            });
        }

        let candidate = self.edited_binding(&session).with_accelerator(&complete.accelerator);
        let outcome = match self.registry.try_register(candidate).await {
            RegistrationResult::Registered { accelerator, .. } => {
                let saved = match self.persist(&id, &accelerator).await {
                    Ok(()) => true,
                    Err(e) => {
                        warn!(id, "Shortcut registered but not saved: {e}");
                        false
                    }
                };
                info!(id, %accelerator, "Shortcut changed");
                CaptureOutcome::Applied {
                    shortcut_id: id.clone(),
                    accelerator,
                    saved,
                }
            }
            RegistrationResult::Conflict(conflict) => {
                warn!(id, accelerator = %conflict.accelerator, "Captured shortcut refused: {}", conflict.reason);
                if let Some(previous) = session.suspended().iter().find(|b| b.id == id) {
                    self.registry.try_register(previous.clone()).await;
                }
                CaptureOutcome::Conflict(conflict)
            }
        };

        self.finish(&session.restore_set()).await;
        Ok(outcome)
    }

    /// Leave capture without applying anything
    pub async fn cancel(&self) -> Result<CaptureOutcome, CaptureError> {
        let session = self
            .session
            .lock()
            .await
            .take()
            .ok_or(CaptureError::NotCapturing)?;
        info!(id = session.binding_id(), "Shortcut capture cancelled");
        self.finish(session.suspended()).await;
        Ok(CaptureOutcome::Cancelled)
    }

    pub async fn check_permission(&self) -> Result<bool, CaptureError> {
        Ok(self.engine.check_input_monitoring().await?)
    }

    /// Ask the engine to open the system permission prompt
    pub async fn request_permission(&self) -> Result<(), CaptureError> {
        Ok(self.engine.request_input_monitoring().await?)
    }

    fn edited_binding(&self, session: &CaptureSession) -> ShortcutBinding {
        session
            .original()
            .cloned()
            .or_else(|| {
                default_bindings()
                    .into_iter()
                    .find(|b| b.id == session.binding_id())
            })
            .unwrap_or_else(|| ShortcutBinding::new(session.binding_id(), "", session.binding_id()))
    }

    async fn persist(&self, id: &str, accelerator: &str) -> Result<(), ConfigError> {
        let mut config = self.settings.load().await?;
        config.set_shortcut_accelerator(id, accelerator);
        self.settings.save(&config).await
    }

    async fn finish(&self, restore: &[ShortcutBinding]) {
        if let Err(e) = self.engine.exit_capture_mode().await {
            warn!("Failed to leave capture mode: {e}");
        }
        self.registry.restore(restore).await;
    }
}
