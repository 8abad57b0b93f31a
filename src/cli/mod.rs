//! CLI layer - Command-line interface
//!
//! Contains argument parsing, output formatting, logging and signal setup,
//! and one runner per subcommand.

pub mod app;
pub mod args;
pub mod config_cmd;
pub mod engine_cmd;
pub mod presenter;
pub mod run_app;
pub mod shortcuts_cmd;
pub mod signals;
pub mod telemetry;

// Re-export commonly used types
pub use app::{CliError, EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE_ERROR};
pub use args::{Cli, Commands, ConfigAction, ShortcutsAction};
pub use presenter::Presenter;
pub use run_app::run_orchestrator;
