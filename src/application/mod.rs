//! Application layer - Use cases and port interfaces
//!
//! Contains the state machines that sit between the engine and the user,
//! and the trait definitions for external system interactions.

pub mod capture;
pub mod clock;
pub mod events;
pub mod orchestrator;
pub mod pipeline;
pub mod ports;
pub mod shortcuts;

#[cfg(test)]
mod testing;

// Re-export use cases
pub use capture::{CaptureError, CaptureOutcome, KeyDisposition, ShortcutCapture};
pub use clock::RecordingClock;
pub use events::{Delivery, EngineEvent, EventBridge, Subscription, Topic};
pub use orchestrator::{Orchestrator, OrchestratorOptions, StartupReport};
pub use pipeline::{
    CancelOutcome, PipelineController, PipelineError, PipelineSnapshot, ToggleOutcome,
    TOGGLE_COOLDOWN,
};
pub use shortcuts::ShortcutRegistry;
