//! Domain layer - Core business logic
//!
//! Contains value objects, state rules, and domain errors.
//! This layer has no dependencies on external systems.

pub mod capture;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod shortcut;

// Re-export common types
pub use capture::{CaptureSession, CaptureTransport, KeyEvent, KeyModifiers};
pub use config::AppConfig;
pub use error::*;
pub use pipeline::{PipelineConfig, PipelineMirror, PipelineResult, PipelineState};
pub use shortcut::{Accelerator, ShortcutBinding};
