//! Recording pipeline orchestrator
//!
//! Wires engine events to the pipeline controller, the shortcut registry and
//! the capture sub-machine. Each topic subscription maps to one transition.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::capture::{CaptureError, CaptureOutcome, ShortcutCapture};
use super::events::{Delivery, EngineEvent, EventBridge, Topic};
use super::pipeline::{PipelineController, ToggleOutcome};
use super::ports::{
    AudioCue, CaptureEngine, ConfigStore, EngineError, NotificationIcon, Notifier,
    PipelineEngine, ShortcutEngine,
};
use super::shortcuts::ShortcutRegistry;
use crate::domain::capture::CaptureTransport;
use crate::domain::config::AppConfig;
use crate::domain::pipeline::{PipelineOverrides, PipelineState};
use crate::domain::shortcut::{shortcut_ids, RegistrationResult};

const NOTIFICATION_TITLE: &str = "HotScribe";

/// Behaviour switches for the orchestrator
#[derive(Debug, Clone, Default)]
pub struct OrchestratorOptions {
    /// Show desktop notifications for hotkey failures
    pub notify: bool,
    /// Applied to every hotkey-triggered stop-and-process
    pub overrides: PipelineOverrides,
}

/// What `start` found and did
#[derive(Debug, Clone)]
pub struct StartupReport {
    /// Adopted pipeline state, `None` if the engine could not be queried
    pub state: Option<PipelineState>,
    pub registrations: Vec<RegistrationResult>,
}

/// Top-level coordinator for one engine connection
pub struct Orchestrator<E, C, N, S>
where
    E: PipelineEngine + CaptureEngine + ShortcutEngine + Clone,
    C: AudioCue,
    N: Notifier,
    S: ConfigStore + Clone,
{
    pipeline: PipelineController<E, C, S>,
    registry: Arc<ShortcutRegistry<E>>,
    capture: ShortcutCapture<E, E, S>,
    notifier: N,
    settings: S,
    bridge: EventBridge,
    options: OrchestratorOptions,
    captures: watch::Sender<Option<CaptureOutcome>>,
}

impl<E, C, N, S> Orchestrator<E, C, N, S>
where
    E: PipelineEngine + CaptureEngine + ShortcutEngine + Clone,
    C: AudioCue,
    N: Notifier,
    S: ConfigStore + Clone,
{
    pub fn new(
        engine: E,
        cue: C,
        notifier: N,
        settings: S,
        bridge: EventBridge,
        options: OrchestratorOptions,
    ) -> Self {
        let registry = Arc::new(ShortcutRegistry::new(engine.clone()));
        let capture = ShortcutCapture::new(engine.clone(), Arc::clone(&registry), settings.clone());
        let (captures, _) = watch::channel(None);
        Self {
            pipeline: PipelineController::new(engine, cue, settings.clone()),
            registry,
            capture,
            notifier,
            settings,
            bridge,
            options,
            captures,
        }
    }

    pub fn pipeline(&self) -> &PipelineController<E, C, S> {
        &self.pipeline
    }

    pub fn registry(&self) -> &ShortcutRegistry<E> {
        &self.registry
    }

    pub fn capture(&self) -> &ShortcutCapture<E, E, S> {
        &self.capture
    }

    /// Receives every finished capture session
    pub fn watch_captures(&self) -> watch::Receiver<Option<CaptureOutcome>> {
        self.captures.subscribe()
    }

    /// Adopt the engine's pipeline state and register the persisted bindings
    pub async fn start(&self) -> StartupReport {
        let state = match self.pipeline.resync().await {
            Ok(state) => Some(state),
            Err(e) => {
                warn!("Could not query engine state: {e}");
                None
            }
        };

        let config = self.settings.load().await.unwrap_or_else(|e| {
            warn!("Failed to load settings, using default shortcuts: {e}");
            AppConfig::empty()
        });
        self.registry.load(config.shortcut_bindings()).await;
        let registrations = self.registry.register_all().await;

        for conflict in registrations.iter().filter_map(RegistrationResult::conflict) {
            self.report(
                &format!(
                    "Shortcut {} ({}) unavailable: {}",
                    conflict.shortcut_id, conflict.accelerator, conflict.reason
                ),
                NotificationIcon::Shortcut,
            )
            .await;
        }
        info!(
            registered = registrations.iter().filter(|r| r.is_registered()).count(),
            total = registrations.len(),
            "Orchestrator started"
        );

        StartupReport {
            state,
            registrations,
        }
    }

    /// Load the persisted bindings without registering them, adopting
    /// whatever the engine already has registered
    pub async fn attach(&self) -> Result<usize, EngineError> {
        let config = self.settings.load().await.unwrap_or_else(|e| {
            warn!("Failed to load settings, using default shortcuts: {e}");
            AppConfig::empty()
        });
        self.registry.load(config.shortcut_bindings()).await;
        self.registry.sync_with_engine().await
    }

    /// Start capturing a new accelerator for one binding
    pub async fn begin_capture(&self, binding_id: &str) -> Result<CaptureTransport, CaptureError> {
        self.captures.send_replace(None);
        self.capture.enter(binding_id).await
    }

    /// Route a fired hotkey. Returns the toggle outcome if it toggled.
    ///
    /// Hotkeys are discarded during capture: the OS may still deliver events
    /// queued before the bindings were unregistered.
    pub async fn handle_shortcut(&self, id: &str) -> Option<ToggleOutcome> {
        if self.capture.is_active().await || self.registry.is_suspended().await {
            debug!(id, "Shortcut ignored during capture");
            return None;
        }
        if !shortcut_ids::is_toggle(id) {
            debug!(id, "Shortcut has no client-side action");
            return None;
        }
        Some(self.toggle().await)
    }

    /// Toggle recording from a hotkey, reporting failures out of band
    pub async fn toggle(&self) -> ToggleOutcome {
        let outcome = self.pipeline.toggle_recording(&self.options.overrides).await;
        match &outcome {
            ToggleOutcome::Failed(message) => self.report(message, NotificationIcon::Error).await,
            ToggleOutcome::Processed(result) => {
                if let Some(message) = result.error_message() {
                    self.report(message, NotificationIcon::Error).await;
                }
            }
            _ => {}
        }
        outcome
    }

    /// Apply one engine event
    pub async fn dispatch(&self, event: EngineEvent) {
        debug!(topic = ?event.topic(), "Engine event");
        match event {
            EngineEvent::PipelineProgress(_)
            | EngineEvent::PipelineComplete(_)
            | EngineEvent::PipelineCancelled => self.pipeline.handle_event(&event).await,
            EngineEvent::ShortcutTriggered { id } => {
                self.handle_shortcut(&id).await;
            }
            EngineEvent::KeyCaptureUpdate(update) => {
                self.capture.handle_update(&update).await;
            }
            EngineEvent::KeyCaptureComplete(complete) => {
                match self.capture.handle_complete(&complete).await {
                    Ok(outcome) => {
                        if let CaptureOutcome::Conflict(conflict) = &outcome {
                            self.report(&conflict.reason, NotificationIcon::Shortcut)
                                .await;
                        }
                        self.captures.send_replace(Some(outcome));
                    }
                    Err(e) => debug!("Capture completion ignored: {e}"),
                }
            }
        }
    }

    /// Leave capture if one is active
    pub async fn shutdown(&self) {
        if self.capture.is_active().await {
            if let Err(e) = self.capture.cancel().await {
                warn!("Failed to cancel capture on shutdown: {e}");
            }
        }
        info!("Orchestrator stopped");
    }

    /// Capture events were dropped. The completion may have been among them,
    /// so an open session is abandoned and the old bindings come back.
    pub async fn capture_lagged(&self, skipped: u64) {
        if !self.capture.is_active().await {
            debug!(skipped, "Capture events dropped while idle");
            return;
        }
        warn!(skipped, "Capture events dropped, cancelling capture");
        match self.capture.cancel().await {
            Ok(outcome) => {
                self.captures.send_replace(Some(outcome));
            }
            Err(e) => debug!("Capture already finished: {e}"),
        }
    }

    async fn report(&self, message: &str, icon: NotificationIcon) {
        warn!("{message}");
        if self.options.notify {
            if let Err(e) = self
                .notifier
                .notify(NOTIFICATION_TITLE, message, icon)
                .await
            {
                debug!("Notification failed: {e}");
            }
        }
    }
}

impl<E, C, N, S> Orchestrator<E, C, N, S>
where
    E: PipelineEngine + CaptureEngine + ShortcutEngine + Clone + 'static,
    C: AudioCue + 'static,
    N: Notifier + 'static,
    S: ConfigStore + Clone + 'static,
{
    /// Subscribe to every topic and dispatch events until `shutdown` resolves.
    ///
    /// Subscriptions exist once this returns. Hotkey toggles run on their own
    /// task so that progress events keep flowing while a run is processed.
    pub fn spawn<F>(self: Arc<Self>, shutdown: F) -> JoinHandle<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let mut pipeline_events = self.bridge.subscribe(Topic::PIPELINE);
        let mut shortcut_events = self.bridge.subscribe(&[Topic::ShortcutTriggered]);
        let mut capture_events = self.bridge.subscribe(Topic::CAPTURE);

        tokio::spawn(async move {
            tokio::pin!(shutdown);
            loop {
                tokio::select! {
                    _ = &mut shutdown => break,
                    Some(event) = pipeline_events.recv() => self.dispatch(event).await,
                    Some(event) = shortcut_events.recv() => {
                        let this = Arc::clone(&self);
                        tokio::spawn(async move { this.dispatch(event).await });
                    }
                    Some(delivery) = capture_events.next() => match delivery {
                        Delivery::Event(event) => self.dispatch(event).await,
                        Delivery::Lagged(skipped) => self.capture_lagged(skipped).await,
                    },
                    else => {
                        warn!("Engine event stream closed");
                        break;
                    }
                }
            }
            self.shutdown().await;
        })
    }
}
