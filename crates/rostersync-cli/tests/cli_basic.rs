//! Basic CLI E2E tests.
//!
//! Each test runs the binary with HOME pointed at a fresh directory so the
//! real config and keyring are never touched by config commands.

use std::path::Path;
use std::process::Command;

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str]) -> (String, String, i32) {
    let output = Command::new(env!("CARGO_BIN_EXE_rostersync"))
        .args(args)
        .env("HOME", home)
        .env_remove("ROSTERSYNC_ENV")
        .env_remove("ROSTERSYNC_API_KEY")
        .output()
        .expect("Failed to execute CLI command");

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "polling.interval_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "5");
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["config", "set", "polling.cooldown_secs", "120"]);
    assert_eq!(code, 0);

    let (stdout, _, code) = run_cli(home.path(), &["config", "get", "polling.cooldown_secs"]);
    assert_eq!(code, 0);
    assert_eq!(stdout.trim(), "120");
}

#[test]
fn test_config_set_rejects_bad_value() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "set", "polling.interval_secs", "soon"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("error:"));
}

#[test]
fn test_config_get_unknown_key() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "no.such.key"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Unknown configuration key: no.such.key"));
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(home.path(), &["config", "list"]);
    assert_eq!(code, 0);
    let parsed: serde_json::Value = serde_json::from_str(&stdout).unwrap();
    assert_eq!(parsed["colors"]["ready"], "#66FF66");
}

#[test]
fn test_snapshot_without_faction_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["snapshot"]);
    assert_ne!(code, 0);
    assert!(stderr.contains("Faction identifier could not be determined"));
}

#[test]
fn test_login_rejects_blank_key() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["auth", "login", "--key", "   "]);
    assert_ne!(code, 0);
    assert!(stderr.contains("No API key provided"));
}
