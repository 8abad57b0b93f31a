//! One-shot pipeline commands sent straight to the engine

use std::path::Path;
use std::sync::Arc;

use crate::application::ports::{AudioCue, ConfigStore, PipelineEngine};
use crate::application::{CancelOutcome, PipelineController, ToggleOutcome};
use crate::domain::config::{resolve_prompt, AppConfig};
use crate::domain::pipeline::{PipelineOverrides, PipelineResult, PipelineState};
use crate::infrastructure::{create_audio_cue, SocketEngine};

use super::app::CliError;
use super::presenter::{format_elapsed, Presenter};

/// Print the engine's pipeline state
pub async fn handle_status(engine: &SocketEngine, presenter: &Presenter) -> Result<(), CliError> {
    let state = engine.current_state().await?;
    presenter.pipeline_status(state);
    presenter.key_value("socket", &engine.socket_path().path().to_string_lossy());
    Ok(())
}

/// Start or stop-and-process, mirroring one press of the toggle hotkey
pub async fn handle_toggle<S: ConfigStore>(
    engine: SocketEngine,
    config: &AppConfig,
    settings: S,
    presenter: &mut Presenter,
) -> Result<(), CliError> {
    let controller = PipelineController::new(
        Arc::new(engine),
        create_audio_cue(config.play_sounds_or_default()),
        settings,
    );
    toggle_once(&controller, presenter).await
}

async fn toggle_once<E, C, S>(
    controller: &PipelineController<E, C, S>,
    presenter: &mut Presenter,
) -> Result<(), CliError>
where
    E: PipelineEngine,
    C: AudioCue,
    S: ConfigStore,
{
    if controller.resync().await? == PipelineState::Recording {
        presenter.start_spinner("Processing recording...");
    }

    match controller.toggle_recording(&PipelineOverrides::default()).await {
        ToggleOutcome::Started { audio_path } => {
            presenter.success("Recording started");
            presenter.key_value("audio", &audio_path);
            Ok(())
        }
        ToggleOutcome::Processed(result) => report_result(&result, presenter),
        ToggleOutcome::Failed(message) => {
            presenter.stop_spinner();
            Err(CliError::Failed(message))
        }
        ToggleOutcome::Cancelled => {
            presenter.stop_spinner();
            presenter.info("Run was cancelled");
            Ok(())
        }
        ToggleOutcome::CooldownActive => {
            presenter.warn("Toggle ignored: pressed again too quickly");
            Ok(())
        }
        ToggleOutcome::Busy(state) => Err(CliError::Failed(format!(
            "Pipeline is busy ({state}); try again when it finishes"
        ))),
    }
}

/// Abort whatever the engine is doing
pub async fn handle_cancel<S: ConfigStore>(
    engine: SocketEngine,
    config: &AppConfig,
    settings: S,
    presenter: &Presenter,
) -> Result<(), CliError> {
    let controller = PipelineController::new(
        Arc::new(engine),
        create_audio_cue(config.play_sounds_or_default()),
        settings,
    );
    controller.resync().await?;
    match controller.cancel().await {
        CancelOutcome::Cancelled(state) => presenter.success(&format!("Cancelled ({state})")),
        CancelOutcome::NothingRunning => presenter.info("Nothing to cancel"),
    }
    Ok(())
}

/// Transcribe a file with a spinner while the engine works
pub async fn handle_transcribe<S: ConfigStore>(
    engine: SocketEngine,
    config: &AppConfig,
    settings: S,
    file: &Path,
    enhance: bool,
    prompt: Option<&str>,
    presenter: &mut Presenter,
) -> Result<(), CliError> {
    if !file.is_file() {
        return Err(CliError::Usage(format!(
            "No such audio file: {}",
            file.display()
        )));
    }
    // The engine runs in another process and resolves paths on its own
    let file = file
        .canonicalize()
        .map_err(|e| CliError::Usage(format!("Cannot resolve {}: {e}", file.display())))?;

    let overrides = transcribe_overrides(config, enhance, prompt);
    let controller = PipelineController::new(
        Arc::new(engine),
        create_audio_cue(config.play_sounds_or_default()),
        settings,
    );

    presenter.start_spinner(&format!("Transcribing {}...", file.display()));
    let result = controller.transcribe_file(&file, &overrides).await;
    match result {
        Ok(result) => report_result(&result, presenter),
        Err(e) => {
            presenter.spinner_fail("Transcription failed");
            Err(e.into())
        }
    }
}

fn transcribe_overrides(
    config: &AppConfig,
    enhance: bool,
    prompt: Option<&str>,
) -> PipelineOverrides {
    let mut overrides = PipelineOverrides::default();
    if enhance || prompt.is_some() {
        overrides.enhancement_enabled = Some(true);
    }
    if let Some(id) = prompt {
        overrides.enhancement_prompt = Some(resolve_prompt(id, config.custom_prompts()));
    }
    overrides
}

fn report_result(result: &PipelineResult, presenter: &mut Presenter) -> Result<(), CliError> {
    if let Some(message) = result.error_message() {
        presenter.spinner_fail("Processing failed");
        return Err(CliError::Failed(message.to_string()));
    }

    let mut summary = String::from("Done");
    if let Some(secs) = result.duration_seconds {
        summary.push_str(&format!(" ({} of audio)", format_elapsed(secs.round() as u64)));
    }
    if result.is_enhanced {
        summary.push_str(", enhanced");
    }
    presenter.spinner_success(&summary);
    presenter.output(&result.text);
    Ok(())
}
