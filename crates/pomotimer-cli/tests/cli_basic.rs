//! Basic CLI E2E tests.
//!
//! Each test runs the built binary against its own temporary data
//! directory via `POMOTIMER_HOME`.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};

/// Run a CLI command and return (stdout, stderr, exit code).
fn run_cli(home: &Path, args: &[&str], stdin: &str) -> (String, String, i32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_pomotimer"))
        .args(args)
        .env("POMOTIMER_HOME", home)
        .env_remove("RUST_LOG")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to execute CLI command");

    // The child may exit (e.g. on a config error) before reading stdin.
    if let Err(e) = child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(stdin.as_bytes())
    {
        assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe, "Failed to write stdin: {e}");
    }

    let output = child.wait_with_output().expect("Failed to wait for CLI");
    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let code = output.status.code().unwrap_or(-1);

    (stdout, stderr, code)
}

fn run_ok(home: &Path, args: &[&str]) -> String {
    let (stdout, stderr, code) = run_cli(home, args, "");
    assert_eq!(code, 0, "{args:?} failed: {stderr}");
    stdout
}

#[test]
fn test_stats_starts_at_zero() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["stats"]);
    let json: serde_json::Value = serde_json::from_str(&out).expect("stats prints JSON");
    assert_eq!(json["today"], 0);
    assert_eq!(json["total"], 0);
    assert!(json["date"].is_string());
}

#[test]
fn test_config_get_default() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["config", "get", "schedule.focus_duration"]);
    assert_eq!(out.trim(), "25");
}

#[test]
fn test_config_set_then_get() {
    let home = tempfile::tempdir().unwrap();
    assert_eq!(
        run_ok(home.path(), &["config", "set", "schedule.short_break", "7"]).trim(),
        "ok"
    );
    let out = run_ok(home.path(), &["config", "get", "schedule.short_break"]);
    assert_eq!(out.trim(), "7");
    assert!(home.path().join("config.toml").exists());
}

#[test]
fn test_config_unknown_key_fails() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["config", "get", "ui.nope"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("unknown key"));
}

#[test]
fn test_config_list_is_json() {
    let home = tempfile::tempdir().unwrap();
    let out = run_ok(home.path(), &["config", "list"]);
    let json: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(json["notifications"]["permission"], "default");
    assert_eq!(json["ui"]["locale"], "en");
}

#[test]
fn test_chime_writes_wav() {
    let home = tempfile::tempdir().unwrap();
    let wav = home.path().join("chime.wav");
    run_ok(
        home.path(),
        &["chime", "--out", wav.to_str().unwrap(), "--sample-rate", "8000"],
    );
    let bytes = std::fs::read(&wav).unwrap();
    assert_eq!(&bytes[0..4], b"RIFF");
    assert_eq!(bytes.len(), 44 + 6000 * 2);
}

#[test]
fn test_chime_rejects_out_of_range_sample_rate() {
    let home = tempfile::tempdir().unwrap();
    let wav = home.path().join("chime.wav");
    for rate in ["0", "400000"] {
        let (_, stderr, code) = run_cli(
            home.path(),
            &["chime", "--out", wav.to_str().unwrap(), "--sample-rate", rate],
            "",
        );
        assert_ne!(code, 0, "rate {rate} accepted");
        assert!(stderr.contains("sample-rate"), "{stderr}");
    }
    assert!(!wav.exists());
}

#[test]
fn test_run_rejects_hand_edited_zero_duration() {
    let home = tempfile::tempdir().unwrap();
    std::fs::write(
        home.path().join("config.toml"),
        "[schedule]\nfocus_duration = 0\n",
    )
    .unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run"], "q\n");
    assert_eq!(code, 1);
    assert!(stderr.contains("at least one minute"), "{stderr}");
}

#[test]
fn test_run_quits_cleanly() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, stderr, code) = run_cli(home.path(), &["run"], "q\n");
    assert_eq!(code, 0, "run failed: {stderr}");
    assert!(stdout.contains("25:00"));
}

#[test]
fn test_run_starts_in_requested_mode() {
    let home = tempfile::tempdir().unwrap();
    let (stdout, _, code) = run_cli(
        home.path(),
        &["run", "--mode", "short-break", "--minutes", "3"],
        "q\n",
    );
    assert_eq!(code, 0);
    assert!(stdout.contains("03:00"));
    assert!(stdout.contains("SHORT BREAK"));
}

#[test]
fn test_run_rejects_unknown_mode() {
    let home = tempfile::tempdir().unwrap();
    let (_, stderr, code) = run_cli(home.path(), &["run", "--mode", "nap"], "");
    assert_eq!(code, 1);
    assert!(stderr.contains("Unknown mode"));
}

#[test]
fn test_run_remembers_permission_answer() {
    let home = tempfile::tempdir().unwrap();
    // The first command triggers the permission prompt; "n" answers it.
    let (stdout, _, code) = run_cli(home.path(), &["run"], "s\nn\nq\n");
    assert_eq!(code, 0);
    assert!(stdout.contains("[y/n]"));
    let out = run_ok(home.path(), &["config", "get", "notifications.permission"]);
    assert_eq!(out.trim(), "denied");
}

#[test]
fn test_run_ends_on_eof() {
    let home = tempfile::tempdir().unwrap();
    let (_, _, code) = run_cli(home.path(), &["run"], "s\nr\n");
    assert_eq!(code, 0);
}
