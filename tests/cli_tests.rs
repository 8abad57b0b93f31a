//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

fn hotscribe_bin(config_home: &Path) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_hotscribe"));
    cmd.env("XDG_CONFIG_HOME", config_home)
        .env("NO_COLOR", "1")
        .env_remove("HOTSCRIBE_ENGINE_SOCKET")
        .env_remove("HOTSCRIBE_LOG");
    cmd
}

fn run(config_home: &Path, args: &[&str]) -> Output {
    hotscribe_bin(config_home)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn help_output() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["--help"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("shortcuts"));
    assert!(stdout.contains("transcribe"));
    assert!(stdout.contains("--socket"));
}

#[test]
fn version_output() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["--version"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("hotscribe"));
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_subcommand_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &[]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn config_path_command() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["config", "path"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("hotscribe"));
    assert!(stdout.contains("config.toml"));
}

#[test]
fn config_set_then_get() {
    let home = tempfile::tempdir().unwrap();

    let set = run(home.path(), &["config", "set", "play_sounds", "false"]);
    assert!(set.status.success());
    let get = run(home.path(), &["config", "get", "play_sounds"]);
    assert!(get.status.success());
    assert_eq!(stdout(&get).trim(), "false");

    let set = run(
        home.path(),
        &["config", "set", "shortcuts.copy_last", "ctrl+alt+c"],
    );
    assert!(set.status.success());
    let get = run(home.path(), &["config", "get", "shortcuts.copy_last"]);
    assert_eq!(stdout(&get).trim(), "CommandOrControl+Alt+C");
}

#[test]
fn config_rejects_unknown_key_and_bad_value() {
    let home = tempfile::tempdir().unwrap();

    let output = run(home.path(), &["config", "set", "api_key", "x"]);
    assert_eq!(output.status.code(), Some(1));

    let output = run(
        home.path(),
        &["config", "set", "pipeline.insertion_method", "telepathy"],
    );
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn config_init_writes_file() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["config", "init"]);

    assert!(output.status.success());
    assert!(home.path().join("hotscribe").join("config.toml").exists());
}

#[test]
fn shortcuts_validate_prints_canonical_form() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["shortcuts", "validate", "shift+ctrl+space"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output).trim(), "CommandOrControl+Shift+Space");
}

#[test]
fn shortcuts_validate_rejects_modifier_only() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["shortcuts", "validate", "Ctrl+Shift"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn shortcuts_suggest_excludes_the_taken_key() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["shortcuts", "suggest", "F13"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(!stdout.lines().any(|l| l.trim() == "F13"));
    assert!(stdout.lines().any(|l| l.trim() == "F14"));
}

#[test]
fn shortcuts_defaults_lists_every_binding() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["shortcuts", "defaults"]);

    assert!(output.status.success());
    let stdout = stdout(&output);
    assert!(stdout.contains("toggle_recording"));
    assert!(stdout.contains("copy_last"));
}

#[test]
fn capture_unknown_id_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let output = run(home.path(), &["shortcuts", "capture", "open_browser"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn status_without_engine_fails() {
    let home = tempfile::tempdir().unwrap();
    let socket = home.path().join("no-engine.sock");
    let output = run(
        home.path(),
        &["--socket", socket.to_str().unwrap(), "status"],
    );

    assert_eq!(output.status.code(), Some(1));
    assert!(!String::from_utf8_lossy(&output.stderr).is_empty());
}

#[test]
fn transcribe_missing_file_is_a_usage_error() {
    let home = tempfile::tempdir().unwrap();
    let missing = home.path().join("missing.wav");
    let output = run(home.path(), &["transcribe", missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(2));
}
