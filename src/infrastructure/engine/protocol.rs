//! Engine wire protocol
//!
//! Newline-delimited JSON. Every request is one line tagged by `command`;
//! every reply is one line carrying either `data` or an `error`.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ports::EngineError;
use crate::domain::capture::KeyEvent;
use crate::domain::pipeline::PipelineConfig;

/// One engine command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Request {
    PipelineStartRecording,
    PipelineStopAndProcess { config: PipelineConfig },
    PipelineCancel,
    IsPipelineRunning,
    GetPipelineState,
    PipelineTranscribeFile { path: String, config: PipelineConfig },
    EnterCaptureMode,
    ExitCaptureMode,
    ReportKeyEvent(KeyEvent),
    CheckInputMonitoring,
    RequestInputMonitoring,
    RegisterShortcut {
        id: String,
        accelerator: String,
        description: String,
    },
    UnregisterShortcut { id: String },
    UnregisterAllShortcuts,
    ListRegisteredShortcuts,
    /// Keep the connection open and stream events
    Subscribe,
}

/// Failure category reported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Rejected,
    Failed,
    Permission,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplyError {
    pub kind: ErrorKind,
    pub message: String,
}

impl From<ReplyError> for EngineError {
    fn from(error: ReplyError) -> Self {
        match error.kind {
            ErrorKind::Rejected => Self::Rejected(error.message),
            ErrorKind::Permission => Self::PermissionDenied(error.message),
            ErrorKind::Failed | ErrorKind::Unknown => Self::Failed(error.message),
        }
    }
}

/// Reply to one request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reply {
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ReplyError>,
}

impl Reply {
    pub fn success(data: impl Serialize) -> Self {
        Self {
            ok: true,
            data: serde_json::to_value(data).ok(),
            error: None,
        }
    }

    pub fn failure(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            ok: false,
            data: None,
            error: Some(ReplyError {
                kind,
                message: message.into(),
            }),
        }
    }

    /// Payload of a successful reply, or the engine's error
    pub fn into_data(self) -> Result<Value, EngineError> {
        if self.ok {
            return Ok(self.data.unwrap_or(Value::Null));
        }
        Err(match self.error {
            Some(error) => error.into(),
            None => EngineError::Protocol("error reply without details".to_string()),
        })
    }

    /// Decode the payload of a successful reply
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, EngineError> {
        let data = self.into_data()?;
        serde_json::from_value(data).map_err(|e| EngineError::Protocol(e.to_string()))
    }
}
