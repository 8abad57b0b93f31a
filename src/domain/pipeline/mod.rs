//! Pipeline domain module

mod config;
mod mirror;
mod result;
mod state;

pub use config::{PipelineConfig, PipelineOverrides};
pub use mirror::{InvalidStateTransition, PipelineMirror};
pub use result::{PipelineProgress, PipelineResult};
pub use state::PipelineState;
