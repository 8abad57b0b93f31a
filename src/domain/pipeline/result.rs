//! Pipeline progress and result payloads

use serde::{Deserialize, Serialize};

use super::state::PipelineState;

/// Outcome of one completed or failed run.
///
/// Produced exactly once per run and never mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PipelineResult {
    pub success: bool,
    /// Final text after filtering and enhancement
    pub text: String,
    /// Transcription before filtering and enhancement
    pub raw_text: String,
    pub is_enhanced: bool,
    pub duration_seconds: Option<f64>,
    pub audio_path: Option<String>,
    /// Present only when `success` is false
    pub error: Option<String>,
    /// Identifier of the persisted history record
    pub transcription_id: Option<String>,
}

impl PipelineResult {
    /// Build a failed result carrying only an error message
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(message.into()),
            ..Default::default()
        }
    }

    /// Error message of a failed run, or a generic one if the engine sent none
    pub fn error_message(&self) -> Option<&str> {
        if self.success {
            None
        } else {
            Some(self.error.as_deref().unwrap_or("Pipeline failed"))
        }
    }

    /// Terminal state this result corresponds to
    pub fn terminal_state(&self) -> PipelineState {
        if self.success {
            PipelineState::Completed
        } else {
            PipelineState::Failed
        }
    }
}

/// Progress event payload (`pipeline-progress`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineProgress {
    pub state: PipelineState,
    #[serde(default)]
    pub message: String,
}

impl PipelineProgress {
    pub fn new(state: PipelineState, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_has_error_and_no_success() {
        let result = PipelineResult::failure("No speech detected");
        assert!(!result.success);
        assert_eq!(result.error_message(), Some("No speech detected"));
        assert_eq!(result.terminal_state(), PipelineState::Failed);
    }

    #[test]
    fn success_has_no_error_message() {
        let result = PipelineResult {
            success: true,
            text: "hello".to_string(),
            ..Default::default()
        };
        assert_eq!(result.error_message(), None);
        assert_eq!(result.terminal_state(), PipelineState::Completed);
    }

    #[test]
    fn failed_without_message_gets_generic_one() {
        let result = PipelineResult::default();
        assert_eq!(result.error_message(), Some("Pipeline failed"));
    }

    #[test]
    fn result_deserialises_camel_case() {
        let json = r#"{
            "success": true,
            "text": "Hello world.",
            "rawText": "hello world",
            "isEnhanced": true,
            "durationSeconds": 2.5,
            "audioPath": "/tmp/rec.wav",
            "transcriptionId": "abc"
        }"#;
        let result: PipelineResult = serde_json::from_str(json).unwrap();
        assert!(result.success);
        assert_eq!(result.raw_text, "hello world");
        assert!(result.is_enhanced);
        assert_eq!(result.duration_seconds, Some(2.5));
        assert_eq!(result.transcription_id.as_deref(), Some("abc"));
        assert!(result.error.is_none());
    }

    #[test]
    fn progress_message_is_optional() {
        let progress: PipelineProgress =
            serde_json::from_str(r#"{"state":"filtering"}"#).unwrap();
        assert_eq!(progress.state, PipelineState::Filtering);
        assert!(progress.message.is_empty());
    }
}
