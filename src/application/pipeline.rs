//! Pipeline controller use case
//!
//! Debounced, race-free start/stop/cancel surface over an engine whose state
//! can change without local action. The engine owns the state; this keeps a
//! mirror, resynchronises it on demand and applies engine events to it.

use std::path::Path;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use super::clock::RecordingClock;
use super::events::EngineEvent;
use super::ports::{AudioCue, AudioCueType, ConfigStore, EngineError, PipelineEngine};
use crate::domain::config::AppConfig;
use crate::domain::pipeline::{
    InvalidStateTransition, PipelineConfig, PipelineMirror, PipelineOverrides, PipelineProgress,
    PipelineResult, PipelineState,
};

/// Minimum spacing between two acted-upon toggles
pub const TOGGLE_COOLDOWN: Duration = Duration::from_millis(300);

/// Errors from the pipeline controller
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    InvalidState(#[from] InvalidStateTransition),

    #[error("Pipeline is already running ({0})")]
    AlreadyRunning(PipelineState),

    #[error("Not recording (current state: {0})")]
    NotRecording(PipelineState),

    #[error("Run was cancelled")]
    Cancelled,
}

/// Result of a toggle request. Never an error: the hardware path must not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum ToggleOutcome {
    /// Recording started
    Started { audio_path: String },
    /// Recording stopped and the run finished, successfully or not
    Processed(PipelineResult),
    /// The request could not be carried out
    Failed(String),
    /// The run was cancelled while the toggle was in flight
    Cancelled,
    /// Too soon after the previous toggle, or one is still in flight
    CooldownActive,
    /// The pipeline is processing and can neither start nor stop
    Busy(PipelineState),
}

/// Result of a cancel request. Both variants are success.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// A run was aborted; carries the state it was in
    Cancelled(PipelineState),
    /// Nothing was running, nothing changed
    NothingRunning,
}

/// Point-in-time view for presentation
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineSnapshot {
    pub state: PipelineState,
    pub is_running: bool,
    pub elapsed_secs: u64,
    pub audio_path: Option<String>,
    pub last_result: Option<PipelineResult>,
    pub last_error: Option<String>,
}

#[derive(Debug, Default)]
struct ControllerState {
    mirror: PipelineMirror,
    /// Bumped on every start and cancel; stale replies compare against it
    generation: u64,
    /// Set by cancel; late engine events for the dead run are dropped
    discard_events: bool,
    file_job: bool,
    /// A stop-and-process call is awaiting the engine
    stopping: bool,
    audio_path: Option<String>,
    last_result: Option<PipelineResult>,
    last_error: Option<String>,
}

impl ControllerState {
    fn is_running(&self) -> bool {
        self.mirror.is_running() || self.file_job || self.stopping
    }

    fn is_processing(&self) -> bool {
        self.mirror.state().is_processing() || self.file_job
    }
}

#[derive(Debug, Default)]
struct ToggleGuard {
    in_flight: bool,
    last_decision: Option<Instant>,
}

/// Client-side owner of the pipeline state machine
pub struct PipelineController<E, C, S>
where
    E: PipelineEngine,
    C: AudioCue,
    S: ConfigStore,
{
    engine: E,
    cue: C,
    settings: S,
    state: Mutex<ControllerState>,
    toggle: Mutex<ToggleGuard>,
    clock: RecordingClock,
}

impl<E, C, S> PipelineController<E, C, S>
where
    E: PipelineEngine,
    C: AudioCue,
    S: ConfigStore,
{
    pub fn new(engine: E, cue: C, settings: S) -> Self {
        Self {
            engine,
            cue,
            settings,
            state: Mutex::new(ControllerState::default()),
            toggle: Mutex::new(ToggleGuard::default()),
            clock: RecordingClock::new(),
        }
    }

    /// Current mirrored state
    pub async fn state(&self) -> PipelineState {
        self.state.lock().await.mirror.state()
    }

    /// Whether a recording, processing chain or file job is in progress
    pub async fn is_running(&self) -> bool {
        self.state.lock().await.is_running()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.clock.elapsed_secs()
    }

    pub async fn snapshot(&self) -> PipelineSnapshot {
        let state = self.state.lock().await;
        PipelineSnapshot {
            state: state.mirror.state(),
            is_running: state.is_running(),
            elapsed_secs: self.clock.elapsed_secs(),
            audio_path: state.audio_path.clone(),
            last_result: state.last_result.clone(),
            last_error: state.last_error.clone(),
        }
    }

    /// Adopt the engine's view of the pipeline.
    ///
    /// Called on (re)initialisation: the engine may be mid-run while this
    /// side was torn down, so nothing is assumed.
    pub async fn resync(&self) -> Result<PipelineState, PipelineError> {
        let running = self.engine.is_running().await?;
        let engine_state = if running {
            self.engine.current_state().await?
        } else {
            PipelineState::Idle
        };

        let mut state = self.state.lock().await;
        state.discard_events = false;
        if running {
            let previous = state.mirror.observe(engine_state);
            if engine_state == PipelineState::Recording && previous != PipelineState::Recording {
                self.clock.start();
            }
            info!(state = %engine_state, "Adopted engine pipeline state");
        } else if state.is_running() {
            state.mirror.force_idle();
            state.file_job = false;
            state.stopping = false;
            self.clock.clear();
            info!("Engine is idle, dropped stale local run");
        }
        Ok(state.mirror.state())
    }

    /// Ask the engine to start recording
    pub async fn start_recording(&self) -> Result<String, PipelineError> {
        {
            let state = self.state.lock().await;
            if state.is_running() {
                return Err(PipelineError::AlreadyRunning(state.mirror.state()));
            }
        }

        match self.engine.start_recording().await {
            Ok(audio_path) => {
                {
                    let mut state = self.state.lock().await;
                    if !state.mirror.is_recording() {
                        state.mirror.begin_recording()?;
                    }
                    state.generation += 1;
                    state.discard_events = false;
                    state.audio_path = Some(audio_path.clone());
                    state.last_error = None;
                }
                self.clock.start();
                self.play(AudioCueType::RecordingStart).await;
                info!(%audio_path, "Recording started");
                Ok(audio_path)
            }
            Err(EngineError::Rejected(message)) if self.engine_is_running().await => {
                // Another client got there first: adopt its run instead of failing
                warn!("Engine rejected start, already running: {message}");
                if let Err(e) = self.resync().await {
                    warn!("Could not adopt engine state: {e}");
                }
                Err(EngineError::Rejected(message).into())
            }
            Err(e) => {
                {
                    let mut state = self.state.lock().await;
                    state.mirror.observe(PipelineState::Failed);
                    state.last_error = Some(e.to_string());
                }
                self.play(AudioCueType::Error).await;
                error!("Failed to start recording: {e}");
                Err(e.into())
            }
        }
    }

    /// Stop recording and wait for the engine to finish processing.
    ///
    /// Engine and transport failures come back as a failed result; errors are
    /// reserved for "not recording" and "cancelled meanwhile".
    pub async fn stop_and_process(
        &self,
        overrides: &PipelineOverrides,
    ) -> Result<PipelineResult, PipelineError> {
        let generation = {
            let mut state = self.state.lock().await;
            if !state.mirror.is_recording() || state.stopping {
                return Err(PipelineError::NotRecording(state.mirror.state()));
            }
            state.stopping = true;
            state.generation
        };

        self.clock.stop();
        self.play(AudioCueType::RecordingStop).await;

        let config = self.resolve_config(overrides).await;
        debug!(?config, "Stopping recording and processing");

        let result = match self.engine.stop_and_process(&config).await {
            Ok(result) => result,
            Err(e) => PipelineResult::failure(e.to_string()),
        };

        self.finish_run(generation, result).await
    }

    /// Start if idle or finished, stop-and-process if recording.
    ///
    /// Refused while another toggle is in flight or within the cooldown of
    /// the previous toggle's decision.
    pub async fn toggle_recording(&self, overrides: &PipelineOverrides) -> ToggleOutcome {
        {
            let mut guard = self.toggle.lock().await;
            let cooling = guard
                .last_decision
                .is_some_and(|at| at.elapsed() < TOGGLE_COOLDOWN);
            if guard.in_flight || cooling {
                debug!(in_flight = guard.in_flight, "Toggle ignored: cooldown active");
                return ToggleOutcome::CooldownActive;
            }
            guard.in_flight = true;
        }

        let outcome = self.dispatch_toggle(overrides).await;

        {
            let mut guard = self.toggle.lock().await;
            guard.in_flight = false;
            guard.last_decision = Some(Instant::now());
        }
        outcome
    }

    async fn dispatch_toggle(&self, overrides: &PipelineOverrides) -> ToggleOutcome {
        let (current, file_job, stopping) = {
            let state = self.state.lock().await;
            (state.mirror.state(), state.file_job, state.stopping)
        };

        if stopping {
            debug!(state = %current, "Toggle ignored: stop already in progress");
            return ToggleOutcome::Busy(current);
        }

        if current == PipelineState::Recording {
            return match self.stop_and_process(overrides).await {
                Ok(result) => ToggleOutcome::Processed(result),
                Err(PipelineError::Cancelled) => ToggleOutcome::Cancelled,
                Err(e) => ToggleOutcome::Failed(e.to_string()),
            };
        }

        if file_job || !current.can_start() {
            debug!(state = %current, "Toggle ignored: pipeline busy");
            return ToggleOutcome::Busy(current);
        }

        match self.start_recording().await {
            Ok(audio_path) => ToggleOutcome::Started { audio_path },
            Err(e) => ToggleOutcome::Failed(e.to_string()),
        }
    }

    /// Abort the current run.
    ///
    /// Local state drops to idle immediately; the engine is asked to abort
    /// but not waited on for confirmation.
    pub async fn cancel(&self) -> CancelOutcome {
        let aborted = {
            let mut state = self.state.lock().await;
            if !state.is_running() {
                debug!("Cancel ignored: nothing running");
                return CancelOutcome::NothingRunning;
            }
            let aborted = state.mirror.state();
            state.mirror.force_idle();
            state.generation += 1;
            state.discard_events = true;
            state.file_job = false;
            state.stopping = false;
            state.audio_path = None;
            aborted
        };
        self.clock.clear();
        self.play(AudioCueType::RecordingCancel).await;
        info!("Pipeline cancelled");

        if let Err(e) = self.engine.cancel().await {
            warn!("Engine cancel failed: {e}");
        }
        CancelOutcome::Cancelled(aborted)
    }

    /// Clear a finished run back to idle
    pub async fn reset(&self) -> Result<(), PipelineError> {
        let mut state = self.state.lock().await;
        if state.file_job {
            return Err(PipelineError::AlreadyRunning(state.mirror.state()));
        }
        state.mirror.reset()?;
        state.audio_path = None;
        self.clock.clear();
        Ok(())
    }

    /// Run a pre-recorded audio file through the processing chain.
    ///
    /// Output to the cursor is always disabled.
    pub async fn transcribe_file(
        &self,
        path: &Path,
        overrides: &PipelineOverrides,
    ) -> Result<PipelineResult, PipelineError> {
        let generation = {
            let mut state = self.state.lock().await;
            if state.is_running() {
                return Err(PipelineError::AlreadyRunning(state.mirror.state()));
            }
            state.file_job = true;
            state.generation += 1;
            state.discard_events = false;
            state.last_error = None;
            state.generation
        };

        let config = self.resolve_config(overrides).await.without_output();
        info!(path = %path.display(), "Transcribing file");

        let result = match self.engine.transcribe_file(path, &config).await {
            Ok(result) => result,
            Err(e) => PipelineResult::failure(e.to_string()),
        };

        self.finish_run(generation, result).await
    }

    /// Apply one engine-originated pipeline event
    pub async fn handle_event(&self, event: &EngineEvent) {
        match event {
            EngineEvent::PipelineProgress(progress) => self.apply_progress(progress).await,
            EngineEvent::PipelineComplete(result) => self.apply_complete(result).await,
            EngineEvent::PipelineCancelled => self.apply_cancelled().await,
            _ => {}
        }
    }

    async fn apply_progress(&self, progress: &PipelineProgress) {
        let mut state = self.state.lock().await;
        if state.discard_events {
            debug!(state = %progress.state, "Dropped progress for cancelled run");
            return;
        }
        if progress.state == PipelineState::Idle && !state.is_running() {
            return;
        }
        let previous = state.mirror.observe(progress.state);
        if previous != progress.state {
            debug!(from = %previous, to = %progress.state, "{}", progress.message);
        }
        if progress.state != PipelineState::Recording {
            self.clock.stop();
        }
        if !progress.state.is_running() {
            state.file_job = false;
        }
        if progress.state == PipelineState::Failed && !progress.message.is_empty() {
            state.last_error = Some(progress.message.clone());
        }
    }

    async fn apply_complete(&self, result: &PipelineResult) {
        let mut state = self.state.lock().await;
        if state.discard_events || !state.is_processing() {
            debug!("Ignored completion outside a processing run");
            return;
        }
        state.mirror.finish(result.success);
        state.last_result = Some(result.clone());
        state.last_error = result.error_message().map(str::to_string);
    }

    async fn apply_cancelled(&self) {
        let mut state = self.state.lock().await;
        if state.is_running() {
            state.mirror.force_idle();
            state.file_job = false;
            state.stopping = false;
            state.generation += 1;
            state.discard_events = true;
            self.clock.clear();
            info!("Engine cancelled the run");
        }
    }

    async fn finish_run(
        &self,
        generation: u64,
        result: PipelineResult,
    ) -> Result<PipelineResult, PipelineError> {
        {
            let mut state = self.state.lock().await;
            if state.generation != generation {
                debug!("Dropped result of cancelled run");
                return Err(PipelineError::Cancelled);
            }
            state.file_job = false;
            state.stopping = false;
            state.mirror.finish(result.success);
            state.last_result = Some(result.clone());
            state.last_error = result.error_message().map(str::to_string);
        }

        match result.error_message() {
            None => {
                info!(
                    chars = result.text.len(),
                    enhanced = result.is_enhanced,
                    "Pipeline completed"
                );
                self.play(AudioCueType::Complete).await;
            }
            Some(message) => {
                error!("Pipeline failed: {message}");
                self.play(AudioCueType::Error).await;
            }
        }
        Ok(result)
    }

    async fn engine_is_running(&self) -> bool {
        self.engine.is_running().await.unwrap_or(false)
    }

    /// Resolve run settings now, not at construction: the selected prompt may change
    async fn resolve_config(&self, overrides: &PipelineOverrides) -> PipelineConfig {
        let settings = self.settings.load().await.unwrap_or_else(|e| {
            warn!("Failed to load settings, using defaults: {e}");
            AppConfig::empty()
        });
        PipelineConfig::from_settings(&settings).with_overrides(overrides)
    }

    async fn play(&self, cue: AudioCueType) {
        if let Err(e) = self.cue.play(cue).await {
            debug!(?cue, "Audio cue failed: {e}");
        }
    }
}
