//! Headless orchestrator runner (`hotscribe run`)

use std::sync::Arc;

use tokio::sync::oneshot;
use tracing::info;

use crate::application::{EventBridge, Orchestrator, OrchestratorOptions, StartupReport};
use crate::domain::config::AppConfig;
use crate::domain::shortcut::RegistrationResult;
use crate::infrastructure::{create_audio_cue, create_notifier, SocketEngine, XdgConfigStore};

use super::app::CliError;
use super::presenter::Presenter;
use super::signals::{ShutdownReason, ShutdownSignal};

/// Register shortcuts and dispatch engine events until a shutdown signal or
/// the engine going away
pub async fn run_orchestrator(
    engine: SocketEngine,
    config: &AppConfig,
    settings: XdgConfigStore,
    presenter: &Presenter,
) -> Result<(), CliError> {
    let mut signals = ShutdownSignal::new()
        .map_err(|e| CliError::Failed(format!("Failed to setup signal handler: {e}")))?;

    let engine = Arc::new(engine);
    let bridge = EventBridge::default();
    let pump = engine.subscribe(bridge.clone()).await?;

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::clone(&engine),
        create_audio_cue(config.play_sounds_or_default()),
        create_notifier(config.notify_or_default()),
        settings,
        bridge,
        OrchestratorOptions {
            notify: config.notify_or_default(),
            ..Default::default()
        },
    ));

    let (reason_tx, reason_rx) = oneshot::channel();
    let shutdown = async move {
        let reason = tokio::select! {
            reason = signals.recv() => reason,
            _ = pump => ShutdownReason::EngineClosed,
        };
        let _ = reason_tx.send(reason);
    };
    let task = Arc::clone(&orchestrator).spawn(shutdown);

    let report = orchestrator.start().await;
    print_startup(&report, presenter);
    presenter.info("Listening for shortcuts (Ctrl+C to stop)");

    task.await
        .map_err(|e| CliError::Failed(format!("Event loop crashed: {e}")))?;

    let reason = reason_rx.await.unwrap_or(ShutdownReason::Interrupt);
    info!(%reason, "Shutting down");
    match reason {
        ShutdownReason::EngineClosed => Err(CliError::Failed(
            "Engine closed the event stream".to_string(),
        )),
        _ => {
            presenter.success("Stopped");
            Ok(())
        }
    }
}

fn print_startup(report: &StartupReport, presenter: &Presenter) {
    match report.state {
        Some(state) => presenter.pipeline_status(state),
        None => presenter.warn("Could not read pipeline state from the engine"),
    }

    for registration in &report.registrations {
        match registration {
            RegistrationResult::Registered {
                shortcut_id,
                accelerator,
            } => presenter.success(&format!("{shortcut_id}: {accelerator}")),
            RegistrationResult::Conflict(conflict) => {
                presenter.warn(&format!(
                    "{}: {} unavailable ({})",
                    conflict.shortcut_id, conflict.accelerator, conflict.reason
                ));
                if !conflict.suggestions.is_empty() {
                    presenter.info(&format!("  try: {}", conflict.suggestions.join(", ")));
                }
            }
        }
    }
}
