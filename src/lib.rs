//! HotScribe - hotkey-driven dictation client
//!
//! This crate drives a background speech engine: it registers global
//! shortcuts, toggles the record, transcribe, enhance and paste pipeline,
//! and lets users capture new shortcuts without restarting.
//!
//! # Architecture
//!
//! The crate follows hexagonal (ports & adapters) architecture:
//!
//! - **Domain**: Pipeline states, accelerators, bindings, config and errors
//! - **Application**: Pipeline controller, shortcut registry, capture
//!   sub-machine, orchestrator and the port interfaces (traits)
//! - **Infrastructure**: Adapter implementations (engine socket, audio cues,
//!   notifications, config file)
//! - **CLI**: Command-line interface, argument parsing, logging and signal handling

pub mod application;
pub mod cli;
pub mod domain;
pub mod infrastructure;
