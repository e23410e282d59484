//! Integration tests for CLI argument handling
//!
//! Runs the compiled binaries to check flag parsing, error reporting, and
//! exit codes. Tests that touch the cache redirect it into a temporary
//! home so the user's real cache directory is never read or written.

use std::process::{Command, Output};
use tempfile::TempDir;

/// Runs edgehist with the cache redirected into `home`
fn run_hist(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_edgehist"))
        .args(args)
        .env("HOME", home.path())
        .env("XDG_CACHE_HOME", home.path().join(".cache"))
        .output()
        .expect("Failed to execute edgehist")
}

/// Runs edgejwt with the cache redirected into `home`
fn run_jwt(home: &TempDir, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_edgejwt"))
        .args(args)
        .env("HOME", home.path())
        .env("XDG_CACHE_HOME", home.path().join(".cache"))
        .output()
        .expect("Failed to execute edgejwt")
}

#[test]
fn test_hist_help_flag_exits_successfully() {
    let home = TempDir::new().unwrap();
    let output = run_hist(&home, &["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--history-db"), "Help should mention --history-db");
    assert!(stdout.contains("--since"), "Help should mention --since");
    assert!(stdout.contains("--refresh"), "Help should mention --refresh");
    assert!(stdout.contains("--export"), "Help should mention --export");
}

#[test]
fn test_hist_invalid_since_prints_error_and_exits() {
    let home = TempDir::new().unwrap();
    let output = run_hist(&home, &["--since", "not-a-date"]);
    assert!(!output.status.success(), "Expected invalid --since to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("not-a-date"),
        "Should name the rejected value: {}",
        stderr
    );
}

#[test]
fn test_hist_missing_database_fails_with_message() {
    let home = TempDir::new().unwrap();
    let output = run_hist(&home, &[
        "--history-db",
        "/definitely/not/a/real/History",
        "--refresh",
    ]);
    assert!(!output.status.success(), "Expected missing database to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.is_empty(), "A fatal error should print a message");
}

#[test]
fn test_jwt_help_flag_exits_successfully() {
    let home = TempDir::new().unwrap();
    let output = run_jwt(&home, &["--help"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("--renew"), "Help should mention --renew");
    assert!(stdout.contains("--exp-var"), "Help should mention --exp-var");
    assert!(stdout.contains("--set-env"), "Help should mention --set-env");
}

#[cfg(unix)]
#[test]
fn test_jwt_show_without_token_reports_nothing_cached() {
    let home = TempDir::new().unwrap();
    let output = run_jwt(&home, &["--show"]);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("No token cached"), "stderr was: {}", stderr);
}

#[cfg(unix)]
#[test]
fn test_jwt_set_token_then_show_round_trips() {
    let home = TempDir::new().unwrap();

    let set = run_jwt(&home, &["--set-token", "abc123", "--expiry", "600"]);
    assert!(set.status.success(), "set-token should succeed");

    let show = run_jwt(&home, &["--show"]);
    assert!(show.status.success());
    let stdout = String::from_utf8_lossy(&show.stdout);
    assert_eq!(stdout.trim(), "abc123");
}

#[cfg(unix)]
#[test]
fn test_jwt_rejects_empty_set_token() {
    let home = TempDir::new().unwrap();
    let output = run_jwt(&home, &["--set-token", "  "]);
    assert!(!output.status.success(), "Empty token must fail validation");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("jwt_token"), "stderr was: {}", stderr);
}
