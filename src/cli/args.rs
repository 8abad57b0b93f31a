//! CLI argument definitions using Clap

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// HotScribe - hotkey-driven dictation on top of a background speech engine
#[derive(Parser, Debug)]
#[command(name = "hotscribe")]
#[command(version)]
#[command(about = "Hotkey-driven dictation: record, transcribe and paste with one shortcut")]
#[command(long_about = None)]
pub struct Cli {
    /// Engine socket path (overrides config and HOTSCRIBE_ENGINE_SOCKET)
    #[arg(long, global = true, value_name = "PATH")]
    pub socket: Option<String>,

    /// Enable debug logging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register shortcuts and handle hotkeys until interrupted
    Run {
        /// Show desktop notifications for hotkey failures
        #[arg(short = 'n', long)]
        notify: bool,

        /// Disable audio cues
        #[arg(long)]
        no_sounds: bool,
    },
    /// Show the engine's pipeline state
    Status,
    /// Start recording if idle, stop and process if recording
    Toggle,
    /// Abort the current recording or processing
    Cancel,
    /// Run a pre-recorded audio file through the pipeline
    Transcribe {
        /// Audio file to transcribe
        file: PathBuf,

        /// Enhance the transcription with the language model
        #[arg(short = 'e', long)]
        enhance: bool,

        /// Enhancement template id (implies --enhance)
        #[arg(short = 'p', long, value_name = "ID")]
        prompt: Option<String>,
    },
    /// Inspect and change global shortcuts
    Shortcuts {
        #[command(subcommand)]
        action: ShortcutsAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Shortcut subcommands
#[derive(Subcommand, Debug)]
pub enum ShortcutsAction {
    /// Show configured bindings and what the engine has registered
    List,
    /// Show the bindings shipped out of the box
    Defaults,
    /// Check an accelerator and print its canonical form
    Validate {
        /// Accelerator, e.g. "Ctrl+Shift+Space"
        accelerator: String,
    },
    /// Suggest alternatives to an accelerator
    Suggest {
        /// Accelerator to find alternatives for
        accelerator: String,
    },
    /// Capture a new accelerator for a binding
    Capture {
        /// Binding id (toggle_recording, toggle_recording_alt, copy_last)
        id: String,

        /// Open the system input monitoring prompt first
        #[arg(long)]
        request_permission: bool,
    },
}

/// Config action subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Create config file with defaults
    Init,
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// Config value
        value: String,
    },
    /// Get a config value
    Get {
        /// Config key
        key: String,
    },
    /// List all config values
    List,
    /// Show config file path
    Path,
}

/// Valid config keys
pub const VALID_CONFIG_KEYS: &[&str] = &[
    "engine_socket",
    "log_level",
    "play_sounds",
    "notify",
    "pipeline.apply_dictionary",
    "pipeline.apply_filtering",
    "pipeline.auto_copy",
    "pipeline.auto_paste",
    "pipeline.insertion_method",
    "enhancement.enabled",
    "enhancement.model",
    "enhancement.prompt_id",
    "shortcuts.toggle_recording",
    "shortcuts.toggle_recording_alt",
    "shortcuts.copy_last",
];

/// Valid values for `pipeline.insertion_method`
pub const VALID_INSERTION_METHODS: &[&str] = &["paste", "typing"];

/// Valid values for `log_level`
pub const VALID_LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Check if a config key is valid
pub fn is_valid_config_key(key: &str) -> bool {
    VALID_CONFIG_KEYS.contains(&key)
}
