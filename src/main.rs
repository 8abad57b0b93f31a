//! HotScribe CLI entry point

use std::process::ExitCode;

use clap::Parser;

use hotscribe::cli::{
    app::{connect_engine, load_merged_config, CliError, EXIT_SUCCESS},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    engine_cmd::{handle_cancel, handle_status, handle_toggle, handle_transcribe},
    presenter::Presenter,
    run_orchestrator,
    shortcuts_cmd::handle_shortcuts_command,
    telemetry,
};
use hotscribe::domain::config::AppConfig;
use hotscribe::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut presenter = Presenter::new();
    let store = XdgConfigStore::new();

    // Merge: defaults < file < env < cli
    let cli_config = AppConfig {
        engine_socket: cli.socket.clone(),
        ..Default::default()
    };
    let config = load_merged_config(&store, cli_config).await;
    telemetry::init(cli.verbose, config.log_level_or_default());

    let engine = connect_engine(&config);
    let result = match cli.command {
        Commands::Run { notify, no_sounds } => {
            let config = config.merge(AppConfig {
                notify: notify.then_some(true),
                play_sounds: no_sounds.then_some(false),
                ..Default::default()
            });
            run_orchestrator(engine, &config, store, &presenter).await
        }
        Commands::Status => handle_status(&engine, &presenter).await,
        Commands::Toggle => handle_toggle(engine, &config, store, &mut presenter).await,
        Commands::Cancel => handle_cancel(engine, &config, store, &presenter).await,
        Commands::Transcribe {
            file,
            enhance,
            prompt,
        } => {
            handle_transcribe(
                engine,
                &config,
                store,
                &file,
                enhance,
                prompt.as_deref(),
                &mut presenter,
            )
            .await
        }
        Commands::Shortcuts { action } => {
            handle_shortcuts_command(action, engine, store, &presenter).await
        }
        Commands::Config { action } => handle_config_command(action, &store, &presenter)
            .await
            .map_err(CliError::from),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            presenter.error(&e.to_string());
            if let Some(hint) = e.hint() {
                presenter.info(hint);
            }
            ExitCode::from(e.exit_code())
        }
    }
}
