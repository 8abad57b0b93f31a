//! Pipeline state as reported by the engine

use std::fmt;

use serde::{Deserialize, Serialize};

/// Pipeline execution state.
///
/// Owned by the engine; the client only mirrors it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    #[default]
    Idle,
    Recording,
    Converting,
    Transcribing,
    Filtering,
    Enhancing,
    Outputting,
    Completed,
    Failed,
}

impl PipelineState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Recording => "recording",
            Self::Converting => "converting",
            Self::Transcribing => "transcribing",
            Self::Filtering => "filtering",
            Self::Enhancing => "enhancing",
            Self::Outputting => "outputting",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Anything between start and a terminal state
    pub const fn is_running(&self) -> bool {
        matches!(
            self,
            Self::Recording
                | Self::Converting
                | Self::Transcribing
                | Self::Filtering
                | Self::Enhancing
                | Self::Outputting
        )
    }

    /// Engine-driven processing phases (after recording stopped)
    pub const fn is_processing(&self) -> bool {
        self.is_running() && !matches!(self, Self::Recording)
    }

    /// Completed or failed
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// States from which a new recording may be started
    pub const fn can_start(&self) -> bool {
        matches!(self, Self::Idle | Self::Completed | Self::Failed)
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
