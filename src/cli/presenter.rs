//! CLI presenter for output formatting

use std::time::Duration;

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::domain::pipeline::PipelineState;
use crate::domain::shortcut::ShortcutBinding;

/// Presenter for CLI output formatting.
///
/// Status lines go to stderr; results meant for pipes go to stdout.
pub struct Presenter {
    spinner: Option<ProgressBar>,
}

impl Presenter {
    /// Create a new presenter
    pub fn new() -> Self {
        Self { spinner: None }
    }

    /// Start a spinner with message
    pub fn start_spinner(&mut self, message: &str) {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
                .template("{spinner:.cyan} {msg} {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message(message.to_string());
        spinner.enable_steady_tick(Duration::from_millis(80));
        self.spinner = Some(spinner);
    }

    /// Update spinner message
    pub fn update_spinner(&self, message: &str) {
        if let Some(ref spinner) = self.spinner {
            spinner.set_message(message.to_string());
        }
    }

    /// Mark spinner as success and finish
    pub fn spinner_success(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✓".green(), message));
        }
    }

    /// Mark spinner as failed and finish
    pub fn spinner_fail(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_with_message(format!("{} {}", "✗".red(), message));
        }
    }

    /// Stop spinner without status
    pub fn stop_spinner(&mut self) {
        if let Some(spinner) = self.spinner.take() {
            spinner.finish_and_clear();
        }
    }

    /// Print info message to stderr
    pub fn info(&self, message: &str) {
        eprintln!("{} {}", "ℹ".cyan(), message);
    }

    /// Print success message to stderr
    pub fn success(&self, message: &str) {
        eprintln!("{} {}", "✓".green(), message);
    }

    /// Print warning message to stderr
    pub fn warn(&self, message: &str) {
        eprintln!("{} {}", "⚠".yellow(), message);
    }

    /// Print error message to stderr
    pub fn error(&self, message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Output text to stdout (transcriptions, canonical accelerators)
    pub fn output(&self, text: &str) {
        println!("{}", text);
    }

    /// Print pipeline state
    pub fn pipeline_status(&self, state: PipelineState) {
        eprintln!("{} Pipeline: {}", "●".color(state_color(state)), state);
    }

    /// Print one binding as a table row
    pub fn binding(&self, binding: &ShortcutBinding) {
        let marker = if binding.registered {
            "●".green()
        } else {
            "○".dimmed()
        };
        println!(
            "{} {:<22} {:<32} {}",
            marker,
            binding.id.cyan(),
            binding.accelerator,
            binding.description.dimmed()
        );
    }

    /// Print a key-value pair (for config list)
    pub fn key_value(&self, key: &str, value: &str) {
        println!("{}: {}", key.cyan(), value);
    }
}

impl Default for Presenter {
    fn default() -> Self {
        Self::new()
    }
}

fn state_color(state: PipelineState) -> Color {
    match state {
        PipelineState::Idle => Color::White,
        PipelineState::Recording => Color::Red,
        PipelineState::Completed => Color::Green,
        PipelineState::Failed => Color::Red,
        _ => Color::Yellow,
    }
}

/// Render seconds as `m:ss`
pub fn format_elapsed(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_pads_seconds() {
        assert_eq!(format_elapsed(0), "0:00");
        assert_eq!(format_elapsed(7), "0:07");
        assert_eq!(format_elapsed(125), "2:05");
    }

    #[test]
    fn recording_is_highlighted() {
        assert_eq!(state_color(PipelineState::Recording), Color::Red);
        assert_eq!(state_color(PipelineState::Transcribing), Color::Yellow);
    }

    #[test]
    fn spinner_lifecycle_without_terminal() {
        let mut presenter = Presenter::new();
        presenter.start_spinner("Working");
        presenter.update_spinner("Still working");
        presenter.spinner_success("Done");
        assert!(presenter.spinner.is_none());
    }
}
