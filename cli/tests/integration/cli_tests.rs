//! Integration tests for the CLI skeleton: help, version and the command
//! hierarchy.

#![allow(clippy::expect_used)]

use assert_cmd::Command;
use predicates::prelude::*;

fn vmlc() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("vmlc"));
    cmd.env("NO_COLOR", "1");
    cmd
}

// --- Help and version tests ---

#[test]
fn test_cli_no_args_shows_help_and_exits_two() {
    // clap with arg_required_else_help shows help on stderr and exits 2
    vmlc().assert().code(2).stderr(predicate::str::contains(
        "Compute Engine VM lifecycle from the command line",
    ));
}

#[test]
fn test_cli_help_flag_shows_help() {
    vmlc()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Usage:"))
        .stdout(predicate::str::contains("Commands:"));
}

#[test]
fn test_cli_version_flag_shows_version() {
    vmlc()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_version_command_shows_version() {
    vmlc()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "vmlc {}",
            env!("CARGO_PKG_VERSION")
        )));
}

#[test]
fn test_version_command_json_outputs_valid_json() {
    let output = vmlc()
        .args(["version", "--json"])
        .output()
        .expect("run vmlc");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
}

// --- Command hierarchy tests ---

#[test]
fn test_help_lists_every_command() {
    let output = vmlc().arg("--help").output().expect("run vmlc");
    assert!(output.status.success());
    let help = String::from_utf8_lossy(&output.stdout);
    for command in [
        "profile", "create", "start", "stop", "destroy", "status", "connect", "config", "version",
    ] {
        assert!(help.contains(command), "missing {command} in:\n{help}");
    }
}

#[test]
fn test_stop_help_shows_keep_and_basic() {
    vmlc()
        .args(["stop", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--keep"))
        .stdout(predicate::str::contains("--basic"));
}

#[test]
fn test_create_help_shows_image_script_and_zone() {
    vmlc()
        .args(["create", "--help"])
        .assert()
        .success()
        .stdout(predicate::str::contains("--image"))
        .stdout(predicate::str::contains("--startup-script"))
        .stdout(predicate::str::contains("--zone"));
}

#[test]
fn test_unknown_command_fails() {
    vmlc()
        .arg("archive")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unrecognized subcommand"));
}

#[test]
fn test_global_flags_accepted_after_subcommand() {
    vmlc()
        .args(["version", "--quiet", "--no-color"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}
