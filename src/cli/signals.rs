//! Shutdown signal handling

use std::fmt;
use std::io;

use tokio::signal::unix::{signal, Signal, SignalKind};

/// Why a long-running command stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownReason {
    /// SIGINT (Ctrl+C)
    Interrupt,
    /// SIGTERM
    Terminate,
    /// The engine closed its event stream
    EngineClosed,
}

impl fmt::Display for ShutdownReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Interrupt => write!(f, "SIGINT"),
            Self::Terminate => write!(f, "SIGTERM"),
            Self::EngineClosed => write!(f, "engine disconnected"),
        }
    }
}

/// Listens for SIGINT and SIGTERM.
///
/// Handlers are installed on construction so that a signal arriving before
/// `recv` is awaited is not lost.
pub struct ShutdownSignal {
    sigint: Signal,
    sigterm: Signal,
}

impl ShutdownSignal {
    pub fn new() -> io::Result<Self> {
        Ok(Self {
            sigint: signal(SignalKind::interrupt())?,
            sigterm: signal(SignalKind::terminate())?,
        })
    }

    /// Wait for the first shutdown signal
    pub async fn recv(&mut self) -> ShutdownReason {
        tokio::select! {
            _ = self.sigint.recv() => ShutdownReason::Interrupt,
            _ = self.sigterm.recv() => ShutdownReason::Terminate,
        }
    }
}
