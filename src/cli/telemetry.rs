//! Logging setup

use tracing_subscriber::EnvFilter;

/// Environment variable holding a full `tracing` filter directive
pub const LOG_ENV: &str = "HOTSCRIBE_LOG";

/// Filter directive: `HOTSCRIBE_LOG`, else `debug` when verbose, else the
/// configured level
pub fn filter_directive(env_value: Option<String>, verbose: bool, configured: &str) -> String {
    match env_value.filter(|v| !v.trim().is_empty()) {
        Some(value) => value,
        None if verbose => "debug".to_string(),
        None => configured.to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean.
pub fn init(verbose: bool, configured: &str) {
    let directive = filter_directive(std::env::var(LOG_ENV).ok(), verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    // A second call (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
