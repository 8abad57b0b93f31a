//! Local mirror of the engine-owned pipeline state

use thiserror::Error;

use super::state::PipelineState;

/// Error when a locally-requested transition is not permitted
#[derive(Debug, Clone, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: PipelineState,
    pub action: String,
}

/// Client-side copy of the pipeline state.
///
/// Only two transitions may be requested locally:
///   IDLE | COMPLETED | FAILED -> RECORDING (begin_recording)
///   COMPLETED | FAILED -> IDLE (reset)
///
/// Everything else is observed from the engine (`observe`, `finish`) or
/// forced by a user cancel (`force_idle`).
#[derive(Debug, Default)]
pub struct PipelineMirror {
    state: PipelineState,
}

impl PipelineMirror {
    /// Create a mirror in idle state
    pub fn new() -> Self {
        Self {
            state: PipelineState::Idle,
        }
    }

    /// Get the current state
    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Check if a run is in progress
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Check if currently recording
    pub fn is_recording(&self) -> bool {
        self.state == PipelineState::Recording
    }

    /// Transition to RECORDING after the engine accepted a start
    pub fn begin_recording(&mut self) -> Result<(), InvalidStateTransition> {
        if !self.state.can_start() {
            return Err(self.refuse("start recording"));
        }
        self.state = PipelineState::Recording;
        Ok(())
    }

    /// Clear a terminal state back to IDLE. A no-op when already idle.
    pub fn reset(&mut self) -> Result<(), InvalidStateTransition> {
        if self.state.is_running() {
            return Err(self.refuse("reset"));
        }
        self.state = PipelineState::Idle;
        Ok(())
    }

    /// Adopt a state reported by the engine. Returns the previous state.
    pub fn observe(&mut self, state: PipelineState) -> PipelineState {
        std::mem::replace(&mut self.state, state)
    }

    /// Record the terminal outcome of a run
    pub fn finish(&mut self, success: bool) {
        self.state = if success {
            PipelineState::Completed
        } else {
            PipelineState::Failed
        };
    }

    /// Drop to IDLE regardless of the current state (user cancel)
    pub fn force_idle(&mut self) {
        self.state = PipelineState::Idle;
    }

    fn refuse(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }
}
