//! Coarse recording-duration clock

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::task::JoinHandle;

/// Tick interval of the clock
pub const TICK: Duration = Duration::from_secs(1);

/// Counts whole seconds while a recording is in progress.
///
/// Display-only; nothing depends on it being wall-clock accurate.
#[derive(Debug, Default)]
pub struct RecordingClock {
    elapsed: Arc<AtomicU64>,
    ticker: Mutex<Option<JoinHandle<()>>>,
}

impl RecordingClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart counting from zero. Must be called inside a tokio runtime.
    pub fn start(&self) {
        self.elapsed.store(0, Ordering::SeqCst);
        let elapsed = Arc::clone(&self.elapsed);
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(TICK);
            interval.tick().await;
            loop {
                interval.tick().await;
                elapsed.fetch_add(1, Ordering::SeqCst);
            }
        });
        if let Some(previous) = self.slot().replace(handle) {
            previous.abort();
        }
    }

    /// Stop counting, keeping the elapsed value
    pub fn stop(&self) {
        if let Some(handle) = self.slot().take() {
            handle.abort();
        }
    }

    /// Stop counting and reset to zero
    pub fn clear(&self) {
        self.stop();
        self.elapsed.store(0, Ordering::SeqCst);
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed.load(Ordering::SeqCst)
    }

    pub fn is_ticking(&self) -> bool {
        self.slot().is_some()
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<JoinHandle<()>>> {
        self.ticker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for RecordingClock {
    fn drop(&mut self) {
        self.stop();
    }
}
