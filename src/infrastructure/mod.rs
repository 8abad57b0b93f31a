//! Infrastructure layer - Adapter implementations
//!
//! Contains concrete implementations of the port interfaces: the engine
//! socket client, audio cues, desktop notifications and the config file.

pub mod audio_cue;
pub mod config;
pub mod engine;
pub mod notification;

// Re-export adapters
pub use audio_cue::{create_audio_cue, NoOpAudioCue, RodioAudioCue};
pub use config::XdgConfigStore;
pub use engine::{SocketEngine, SocketPath};
pub use notification::{create_notifier, NoOpNotifier, NotifyRustNotifier};
