//! Integration tests for the `accessly` CLI binary.
//!
//! These tests validate argument parsing, help output, shell
//! completions, and error handling without a live controller.
#![allow(clippy::unwrap_used)]

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────

/// Build a [`Command`] for the `accessly` binary with env isolation.
///
/// Clears all `ACCESSLY_*` env vars and points config directories at a
/// nonexistent path so tests never touch the user's real configuration.
fn accessly_cmd() -> assert_cmd::Command {
    let mut cmd = cargo_bin_cmd!("accessly");
    cmd.env("HOME", "/tmp/accessly-test-nonexistent")
        .env("XDG_CONFIG_HOME", "/tmp/accessly-test-nonexistent")
        .env_remove("ACCESSLY_PROFILE")
        .env_remove("ACCESSLY_CONTROLLER")
        .env_remove("ACCESSLY_TOKEN")
        .env_remove("ACCESSLY_OUTPUT")
        .env_remove("ACCESSLY_INSECURE")
        .env_remove("ACCESSLY_TIMEOUT");
    cmd
}

/// Concatenate stdout + stderr from a command output for flexible matching.
fn combined_output(output: &std::process::Output) -> String {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    format!("{stdout}{stderr}")
}

// ── Basic invocation ────────────────────────────────────────────────

#[test]
fn test_no_args_shows_help() {
    let output = accessly_cmd().output().unwrap();
    assert_eq!(output.status.code(), Some(2), "Expected exit code 2");
    let text = combined_output(&output);
    assert!(text.contains("Usage"), "Expected 'Usage' in output:\n{text}");
}

#[test]
fn test_help_flag() {
    accessly_cmd().arg("--help").assert().success().stdout(
        predicate::str::contains("UniFi Access")
            .and(predicate::str::contains("doors"))
            .and(predicate::str::contains("config")),
    );
}

#[test]
fn test_version_flag() {
    accessly_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("accessly"));
}

// ── Shell completions ───────────────────────────────────────────────

#[test]
fn test_completions_bash() {
    accessly_cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty().not());
}

#[test]
fn test_completions_zsh() {
    accessly_cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef"));
}

// ── Error cases ─────────────────────────────────────────────────────

#[test]
fn test_invalid_subcommand() {
    let output = accessly_cmd().arg("foobar").output().unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid subcommand"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid") || text.contains("unrecognized") || text.contains("foobar"),
        "Expected error mentioning invalid subcommand:\n{text}"
    );
}

#[test]
fn test_doors_list_no_controller() {
    accessly_cmd()
        .args(["doors", "list"])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("controller"))
                .or(predicate::str::contains("profile")),
        );
}

#[test]
fn test_doors_unlock_requires_credentials() {
    // A controller URL without a token must fail on credentials, not
    // attempt a network call.
    accessly_cmd()
        .args([
            "--controller",
            "https://192.0.2.1:12445",
            "doors",
            "unlock",
            "door-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("credentials").or(predicate::str::contains("token")));
}

#[test]
fn test_config_show_no_config() {
    // `config show` renders the default config when no file exists.
    accessly_cmd().args(["config", "show"]).assert().success();
}

#[test]
fn test_invalid_output_format() {
    let output = accessly_cmd()
        .args(["--output", "invalid", "doors", "list"])
        .output()
        .unwrap();
    assert!(
        !output.status.success(),
        "Expected failure for invalid output format"
    );
    let text = combined_output(&output);
    assert!(
        text.contains("invalid")
            || text.contains("possible values")
            || text.contains("valid value"),
        "Expected error about valid output formats:\n{text}"
    );
}

#[test]
fn test_global_flags_parsing() {
    // All flags should parse correctly; the failure should be about
    // missing controller config, not about argument parsing.
    accessly_cmd()
        .args([
            "--output",
            "json",
            "--verbose",
            "--insecure",
            "--timeout",
            "60",
            "doors",
            "list",
        ])
        .assert()
        .failure()
        .stderr(
            predicate::str::contains("config")
                .or(predicate::str::contains("Configuration"))
                .or(predicate::str::contains("controller"))
                .or(predicate::str::contains("profile")),
        );
}

// ── Subcommand help discovery ───────────────────────────────────────

#[test]
fn test_doors_subcommands_exist() {
    accessly_cmd()
        .args(["doors", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("list")
                .and(predicate::str::contains("get"))
                .and(predicate::str::contains("unlock"))
                .and(predicate::str::contains("watch")),
        );
}

#[test]
fn test_config_subcommands_exist() {
    accessly_cmd()
        .args(["config", "--help"])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("init")
                .and(predicate::str::contains("show"))
                .and(predicate::str::contains("profiles")),
        );
}
