//! Shortcut command handler

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;

use crate::application::ports::{ConfigStore, ShortcutEngine};
use crate::application::{
    CaptureError, CaptureOutcome, EventBridge, KeyDisposition, Orchestrator, OrchestratorOptions,
};
use crate::domain::capture::{CaptureTransport, KeyEvent, KeyEventKind, KeyModifiers};
use crate::domain::shortcut::{
    default_bindings, shortcut_ids, suggest_alternatives, validate_accelerator, Accelerator,
};
use crate::infrastructure::{NoOpAudioCue, NoOpNotifier, SocketEngine, XdgConfigStore};

use super::app::CliError;
use super::args::ShortcutsAction;
use super::presenter::Presenter;
use super::signals::ShutdownSignal;

/// Handle shortcuts subcommand
pub async fn handle_shortcuts_command(
    action: ShortcutsAction,
    engine: SocketEngine,
    settings: XdgConfigStore,
    presenter: &Presenter,
) -> Result<(), CliError> {
    match action {
        ShortcutsAction::List => handle_list(&engine, &settings, presenter).await,
        ShortcutsAction::Defaults => {
            for binding in default_bindings() {
                presenter.binding(&binding);
            }
            Ok(())
        }
        ShortcutsAction::Validate { accelerator } => handle_validate(&accelerator, presenter),
        ShortcutsAction::Suggest { accelerator } => {
            for suggestion in suggest_alternatives(&accelerator) {
                presenter.output(&suggestion);
            }
            Ok(())
        }
        ShortcutsAction::Capture {
            id,
            request_permission,
        } => handle_capture(engine, settings, &id, request_permission, presenter).await,
    }
}

async fn handle_list<S: ConfigStore>(
    engine: &SocketEngine,
    settings: &S,
    presenter: &Presenter,
) -> Result<(), CliError> {
    let config = settings.load().await?;
    let mut bindings = config.shortcut_bindings();

    match engine.list_registered_shortcuts().await {
        Ok(live) => {
            for binding in &mut bindings {
                binding.registered = live
                    .iter()
                    .any(|l| l.id == binding.id && l.accelerator == binding.accelerator);
            }
        }
        Err(e) => presenter.warn(&format!("Registration status unknown: {e}")),
    }

    for binding in &bindings {
        presenter.binding(binding);
    }
    for id in shortcut_ids::ALL {
        if bindings.iter().all(|b| b.id != *id) {
            presenter.key_value(id, "(disabled)");
        }
    }
    Ok(())
}

fn handle_validate(input: &str, presenter: &Presenter) -> Result<(), CliError> {
    let accelerator = validate_accelerator(input)?;
    presenter.output(&accelerator.to_string());
    presenter.info(&accelerator.display_names().join(" + "));
    Ok(())
}

type CliOrchestrator = Orchestrator<Arc<SocketEngine>, NoOpAudioCue, NoOpNotifier, XdgConfigStore>;

async fn handle_capture(
    engine: SocketEngine,
    settings: XdgConfigStore,
    id: &str,
    request_permission: bool,
    presenter: &Presenter,
) -> Result<(), CliError> {
    if !shortcut_ids::ALL.contains(&id) {
        return Err(CliError::Usage(format!(
            "Unknown shortcut id '{}'. Valid ids: {}",
            id,
            shortcut_ids::ALL.join(", ")
        )));
    }
    let mut signals = ShutdownSignal::new()
        .map_err(|e| CliError::Failed(format!("Failed to setup signal handler: {e}")))?;

    let engine = Arc::new(engine);
    let bridge = EventBridge::default();
    let mut pump = engine.subscribe(bridge.clone()).await?;

    let orchestrator: Arc<CliOrchestrator> = Arc::new(Orchestrator::new(
        Arc::clone(&engine),
        NoOpAudioCue::new(),
        NoOpNotifier::new(),
        settings,
        bridge,
        OrchestratorOptions::default(),
    ));
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let task = Arc::clone(&orchestrator).spawn(async move {
        let _ = stop_rx.wait_for(|stop| *stop).await;
    });

    let result = tokio::select! {
        result = run_capture(&orchestrator, id, request_permission, &mut signals, presenter) => result,
        _ = &mut pump => Err(CliError::Failed("Engine closed the event stream".to_string())),
    };

    let _ = stop_tx.send(true);
    if task.await.is_err() {
        tracing::warn!("Capture event loop ended abnormally");
    }
    pump.abort();
    result
}

async fn run_capture(
    orchestrator: &CliOrchestrator,
    id: &str,
    request_permission: bool,
    signals: &mut ShutdownSignal,
    presenter: &Presenter,
) -> Result<(), CliError> {
    orchestrator.attach().await?;
    if request_permission {
        orchestrator.capture().request_permission().await?;
        presenter.info("Grant input monitoring in the system prompt, then continue");
    }

    let mut outcomes = orchestrator.watch_captures();
    let transport = match orchestrator.begin_capture(id).await {
        Ok(transport) => transport,
        Err(CaptureError::PermissionRequired { message }) => {
            return Err(CliError::Failed(message));
        }
        Err(e) => return Err(e.into()),
    };

    let outcome = match transport {
        CaptureTransport::Privileged => {
            presenter.info("Press the new shortcut (Escape or Ctrl+C to cancel)");
            tokio::select! {
                outcome = wait_for_outcome(&mut outcomes) => outcome,
                _ = signals.recv() => orchestrator.capture().cancel().await?,
            }
        }
        CaptureTransport::Fallback => {
            presenter.info("Type the new shortcut, e.g. Ctrl+Shift+Space (empty line cancels)");
            tokio::select! {
                outcome = type_accelerator(orchestrator, &mut outcomes, presenter) => outcome?,
                _ = signals.recv() => orchestrator.capture().cancel().await?,
            }
        }
    };
    report_outcome(outcome, presenter)
}

/// Wait for the engine to finish the capture session
async fn wait_for_outcome(
    outcomes: &mut watch::Receiver<Option<CaptureOutcome>>,
) -> CaptureOutcome {
    match outcomes.wait_for(Option::is_some).await {
        Ok(outcome) => outcome.clone().unwrap_or(CaptureOutcome::Cancelled),
        Err(_) => CaptureOutcome::Cancelled,
    }
}

/// Fallback transport: read an accelerator from stdin and replay it as key
/// events, the way a focused capture field would observe them
async fn type_accelerator(
    orchestrator: &CliOrchestrator,
    outcomes: &mut watch::Receiver<Option<CaptureOutcome>>,
    presenter: &Presenter,
) -> Result<CaptureOutcome, CliError> {
    let capture = orchestrator.capture();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = lines
            .next_line()
            .await
            .map_err(|e| CliError::Failed(format!("Failed to read input: {e}")))?
            .unwrap_or_default();
        let line = line.trim();
        if line.is_empty() || line.eq_ignore_ascii_case("escape") {
            let escape = KeyEvent::down("Escape", "Escape", KeyModifiers::none());
            capture.key_down(&escape).await?;
            return Ok(CaptureOutcome::Cancelled);
        }

        let accelerator = match Accelerator::parse(line) {
            Ok(accelerator) if !accelerator.is_sided_modifier() => accelerator,
            Ok(_) => {
                presenter.warn("Single modifier keys can only be captured with input monitoring");
                continue;
            }
            Err(e) => {
                presenter.warn(&format!("{e}. Try again"));
                continue;
            }
        };

        for event in KeyEvent::sequence_for(&accelerator) {
            let disposition = match event.kind {
                KeyEventKind::Down => capture.key_down(&event).await?,
                KeyEventKind::Up => capture.key_up(&event).await?,
            };
            if let KeyDisposition::Preview(keys) = disposition {
                tracing::debug!(?keys, "Capture preview");
            }
        }
        return Ok(wait_for_outcome(outcomes).await);
    }
}

fn report_outcome(outcome: CaptureOutcome, presenter: &Presenter) -> Result<(), CliError> {
    match outcome {
        CaptureOutcome::Applied {
            shortcut_id,
            accelerator,
            saved,
        } => {
            presenter.success(&format!("{shortcut_id} is now {accelerator}"));
            if !saved {
                presenter.warn("The shortcut is active but could not be saved to the config file");
            }
            Ok(())
        }
        CaptureOutcome::Conflict(conflict) => {
            if !conflict.suggestions.is_empty() {
                presenter.info(&format!("Try: {}", conflict.suggestions.join(", ")));
            }
            Err(CliError::Failed(format!(
                "{} was not applied: {}",
                conflict.accelerator, conflict.reason
            )))
        }
        CaptureOutcome::Invalid { keys } => Err(CliError::Failed(format!(
            "No valid shortcut captured{}",
            if keys.is_empty() {
                String::new()
            } else {
                format!(" (got {})", keys.join(" + "))
            }
        ))),
        CaptureOutcome::Cancelled => {
            presenter.info("Capture cancelled; shortcuts unchanged");
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::AppConfig;
    use crate::domain::shortcut::{ConflictKind, ShortcutConflict};

    #[test]
    fn validate_prints_canonical_form() {
        assert!(handle_validate("shift+ctrl+space", &Presenter::new()).is_ok());
        assert!(matches!(
            handle_validate("Ctrl+", &Presenter::new()),
            Err(CliError::Accelerator(_))
        ));
    }

    #[test]
    fn conflict_outcome_fails_the_command() {
        let conflict = ShortcutConflict {
            shortcut_id: "copy_last".into(),
            accelerator: "F13".into(),
            kind: ConflictKind::AlreadyRegistered,
            reason: "taken".into(),
            suggestions: vec!["F15".into()],
        };
        let err = report_outcome(CaptureOutcome::Conflict(conflict), &Presenter::new()).unwrap_err();
        assert!(err.to_string().contains("taken"));
    }

    #[test]
    fn cancel_and_unsaved_apply_succeed() {
        let presenter = Presenter::new();
        assert!(report_outcome(CaptureOutcome::Cancelled, &presenter).is_ok());
        assert!(report_outcome(
            CaptureOutcome::Applied {
                shortcut_id: "copy_last".into(),
                accelerator: "F15".into(),
                saved: false,
            },
            &presenter
        )
        .is_ok());
    }

    #[tokio::test]
    async fn unknown_id_is_a_usage_error() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SocketEngine::new(crate::infrastructure::SocketPath::with_path(
            dir.path().join("engine.sock"),
        ));
        let store = XdgConfigStore::with_path(dir.path().join("c.toml"));
        let err = handle_capture(engine, store, "open_browser", false, &Presenter::new())
            .await
            .unwrap_err();
        assert!(matches!(err, CliError::Usage(_)));
    }

    #[tokio::test]
    async fn list_works_without_engine() {
        let dir = tempfile::tempdir().unwrap();
        let engine = SocketEngine::new(crate::infrastructure::SocketPath::with_path(
            dir.path().join("engine.sock"),
        ));
        let store = XdgConfigStore::with_path(dir.path().join("c.toml"));
        store.save(&AppConfig::defaults()).await.unwrap();
        assert!(handle_list(&engine, &store, &Presenter::new()).await.is_ok());
    }
}
