//! Port interfaces (traits) for external systems
//!
//! These traits define the boundaries between the application
//! and infrastructure layers.

pub mod audio_cue;
pub mod config;
pub mod engine;
pub mod notifier;

// Re-export common types
pub use audio_cue::{AudioCue, AudioCueError, AudioCueType};
pub use config::ConfigStore;
pub use engine::{CaptureEngine, EngineError, PipelineEngine, ShortcutEngine};
pub use notifier::{NotificationError, NotificationIcon, Notifier};
