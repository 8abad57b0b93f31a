//! Domain error types

use thiserror::Error;

/// Error when an accelerator string does not follow the key grammar
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AcceleratorError {
    #[error("Shortcut cannot be empty")]
    Empty,

    #[error("Shortcut \"{0}\" contains an empty key part")]
    EmptyPart(String),

    #[error("Shortcut \"{0}\" has no main key (modifiers alone are not allowed)")]
    MissingKey(String),

    #[error("Shortcut \"{0}\" names more than one main key")]
    MultipleKeys(String),

    #[error("Unknown key: \"{0}\"")]
    UnknownKey(String),

    #[error("Shortcut \"{0}\" contains invalid characters")]
    InvalidCharacters(String),
}

/// Error when configuration fails
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(String),

    #[error("Failed to parse config file: {0}")]
    ParseError(String),

    #[error("Failed to write config file: {0}")]
    WriteError(String),

    #[error("Invalid config value for '{key}': {message}")]
    ValidationError { key: String, message: String },

    #[error("Config file already exists at: {0}")]
    AlreadyExists(String),
}
