//! In-memory port implementations shared by the application unit tests

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::ports::{
    AudioCue, AudioCueError, AudioCueType, CaptureEngine, ConfigStore, EngineError,
    NotificationError, NotificationIcon, Notifier, PipelineEngine, ShortcutEngine,
};
use crate::domain::capture::{CaptureTransport, KeyEvent};
use crate::domain::config::AppConfig;
use crate::domain::error::ConfigError;
use crate::domain::pipeline::{PipelineConfig, PipelineResult, PipelineState};
use crate::domain::shortcut::ShortcutBinding;

pub const AUDIO_PATH: &str = "/tmp/hotscribe-test.wav";

/// Scriptable engine implementing every engine port
pub struct FakeEngine {
    pub calls: Mutex<Vec<String>>,
    pub state: Mutex<PipelineState>,
    pub start_error: Mutex<Option<EngineError>>,
    pub process_reply: Mutex<Result<PipelineResult, EngineError>>,
    pub process_delay: Mutex<Duration>,
    pub last_config: Mutex<Option<PipelineConfig>>,
    pub cancel_error: Mutex<Option<EngineError>>,
    pub transport: Mutex<Result<CaptureTransport, EngineError>>,
    pub key_events: Mutex<Vec<KeyEvent>>,
    pub registered: Mutex<Vec<ShortcutBinding>>,
    pub register_errors: Mutex<HashMap<String, EngineError>>,
    pub unregister_all_error: Mutex<Option<EngineError>>,
}

impl FakeEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            state: Mutex::new(PipelineState::Idle),
            start_error: Mutex::new(None),
            process_reply: Mutex::new(Ok(success("hello world"))),
            process_delay: Mutex::new(Duration::ZERO),
            last_config: Mutex::new(None),
            cancel_error: Mutex::new(None),
            transport: Mutex::new(Ok(CaptureTransport::Privileged)),
            key_events: Mutex::new(Vec::new()),
            registered: Mutex::new(Vec::new()),
            register_errors: Mutex::new(HashMap::new()),
            unregister_all_error: Mutex::new(None),
        }
    }

    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| *c == call).count()
    }

    pub fn registered_ids(&self) -> Vec<String> {
        self.registered
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.id.clone())
            .collect()
    }

    pub fn registered_accelerator(&self, id: &str) -> Option<String> {
        self.registered
            .lock()
            .unwrap()
            .iter()
            .find(|b| b.id == id)
            .map(|b| b.accelerator.clone())
    }

    pub fn set_state(&self, state: PipelineState) {
        *self.state.lock().unwrap() = state;
    }

    pub fn fail_register(&self, accelerator: &str, error: EngineError) {
        self.register_errors
            .lock()
            .unwrap()
            .insert(accelerator.to_string(), error);
    }

    fn record(&self, call: &str) {
        self.calls.lock().unwrap().push(call.to_string());
    }

    async fn process(&self, config: &PipelineConfig) -> Result<PipelineResult, EngineError> {
        *self.last_config.lock().unwrap() = Some(config.clone());
        let delay = *self.process_delay.lock().unwrap();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        *self.state.lock().unwrap() = PipelineState::Idle;
        self.process_reply.lock().unwrap().clone()
    }
}

pub fn success(text: &str) -> PipelineResult {
    PipelineResult {
        success: true,
        text: text.to_string(),
        raw_text: text.to_string(),
        duration_seconds: Some(1.5),
        audio_path: Some(AUDIO_PATH.to_string()),
        transcription_id: Some("rec-1".to_string()),
        ..Default::default()
    }
}

#[async_trait]
impl PipelineEngine for FakeEngine {
    async fn start_recording(&self) -> Result<String, EngineError> {
        self.record("start_recording");
        if let Some(err) = self.start_error.lock().unwrap().clone() {
            return Err(err);
        }
        let mut state = self.state.lock().unwrap();
        if state.is_running() {
            return Err(EngineError::Rejected("Pipeline is already running".into()));
        }
        *state = PipelineState::Recording;
        Ok(AUDIO_PATH.to_string())
    }

    async fn stop_and_process(
        &self,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, EngineError> {
        self.record("stop_and_process");
        self.process(config).await
    }

    async fn cancel(&self) -> Result<(), EngineError> {
        self.record("cancel");
        *self.state.lock().unwrap() = PipelineState::Idle;
        match self.cancel_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    async fn is_running(&self) -> Result<bool, EngineError> {
        Ok(self.state.lock().unwrap().is_running())
    }

    async fn current_state(&self) -> Result<PipelineState, EngineError> {
        Ok(*self.state.lock().unwrap())
    }

    async fn transcribe_file(
        &self,
        _path: &Path,
        config: &PipelineConfig,
    ) -> Result<PipelineResult, EngineError> {
        self.record("transcribe_file");
        self.process(config).await
    }
}

#[async_trait]
impl CaptureEngine for FakeEngine {
    async fn enter_capture_mode(&self) -> Result<CaptureTransport, EngineError> {
        self.record("enter_capture_mode");
        self.transport.lock().unwrap().clone()
    }

    async fn exit_capture_mode(&self) -> Result<(), EngineError> {
        self.record("exit_capture_mode");
        Ok(())
    }

    async fn report_key_event(&self, event: &KeyEvent) -> Result<(), EngineError> {
        self.record("report_key_event");
        self.key_events.lock().unwrap().push(event.clone());
        Ok(())
    }

    async fn check_input_monitoring(&self) -> Result<bool, EngineError> {
        Ok(true)
    }

    async fn request_input_monitoring(&self) -> Result<(), EngineError> {
        self.record("request_input_monitoring");
        Ok(())
    }
}

#[async_trait]
impl ShortcutEngine for FakeEngine {
    async fn register_shortcut(&self, binding: &ShortcutBinding) -> Result<(), EngineError> {
        self.record("register_shortcut");
        if let Some(err) = self.register_errors.lock().unwrap().get(&binding.accelerator) {
            return Err(err.clone());
        }
        let mut registered = self.registered.lock().unwrap();
        if registered
            .iter()
            .any(|b| b.accelerator == binding.accelerator && b.id != binding.id)
        {
            return Err(EngineError::Failed("Shortcut already registered".into()));
        }
        registered.retain(|b| b.id != binding.id);
        let mut binding = binding.clone();
        binding.registered = true;
        registered.push(binding);
        Ok(())
    }

    async fn unregister_shortcut(&self, id: &str) -> Result<(), EngineError> {
        self.record("unregister_shortcut");
        self.registered.lock().unwrap().retain(|b| b.id != id);
        Ok(())
    }

    async fn unregister_all_shortcuts(&self) -> Result<(), EngineError> {
        self.record("unregister_all_shortcuts");
        if let Some(err) = self.unregister_all_error.lock().unwrap().clone() {
            return Err(err);
        }
        self.registered.lock().unwrap().clear();
        Ok(())
    }

    async fn list_registered_shortcuts(&self) -> Result<Vec<ShortcutBinding>, EngineError> {
        Ok(self.registered.lock().unwrap().clone())
    }
}

/// Audio cue that remembers what it played
#[derive(Clone, Default)]
pub struct RecordingCue {
    pub played: Arc<Mutex<Vec<AudioCueType>>>,
}

impl RecordingCue {
    pub fn played(&self) -> Vec<AudioCueType> {
        self.played.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioCue for RecordingCue {
    async fn play(&self, cue_type: AudioCueType) -> Result<(), AudioCueError> {
        self.played.lock().unwrap().push(cue_type);
        Ok(())
    }
}

/// Config store backed by memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    pub config: Arc<Mutex<AppConfig>>,
    pub fail_save: Arc<Mutex<bool>>,
}

impl MemoryStore {
    pub fn with(config: AppConfig) -> Self {
        Self {
            config: Arc::new(Mutex::new(config)),
            fail_save: Arc::default(),
        }
    }

    pub fn snapshot(&self) -> AppConfig {
        self.config.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConfigStore for MemoryStore {
    async fn load(&self) -> Result<AppConfig, ConfigError> {
        Ok(self.snapshot())
    }

    async fn save(&self, config: &AppConfig) -> Result<(), ConfigError> {
        if *self.fail_save.lock().unwrap() {
            return Err(ConfigError::WriteError("read-only".into()));
        }
        *self.config.lock().unwrap() = config.clone();
        Ok(())
    }

    fn path(&self) -> PathBuf {
        PathBuf::from("/dev/null")
    }

    fn exists(&self) -> bool {
        true
    }

    async fn init(&self) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Notifier that remembers what it showed
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub shown: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingNotifier {
    pub fn shown(&self) -> Vec<(String, String)> {
        self.shown.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn notify(
        &self,
        title: &str,
        message: &str,
        _icon: NotificationIcon,
    ) -> Result<(), NotificationError> {
        self.shown
            .lock()
            .unwrap()
            .push((title.to_string(), message.to_string()));
        Ok(())
    }
}
