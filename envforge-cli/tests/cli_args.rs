//! End-to-end checks of the binary's argument surface.

use std::process::Command;

fn envforge() -> Command {
    Command::new(env!("CARGO_BIN_EXE_envforge"))
}

#[test]
fn help_lists_every_subcommand() {
    let output = envforge().arg("--help").output().expect("binary runs");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for subcommand in ["init", "start", "update", "status", "stop", "delete"] {
        assert!(stdout.contains(subcommand), "help is missing {subcommand}");
    }
}

#[test]
fn version_prints_the_crate_version() {
    let output = envforge().arg("--version").output().expect("binary runs");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn unknown_subcommand_fails() {
    let output = envforge().arg("explode").output().expect("binary runs");
    assert!(!output.status.success());
}

#[test]
fn invalid_region_is_rejected_before_any_work() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = envforge()
        .current_dir(dir.path())
        .args(["status", "--region", "moon-base-1"])
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("moon-base-1"));
}

#[test]
fn status_without_a_project_points_at_init() {
    let dir = tempfile::tempdir().expect("temp dir");
    let output = envforge()
        .current_dir(dir.path())
        .env("HOME", dir.path())
        .arg("status")
        .output()
        .expect("binary runs");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("envforge init"), "stderr was: {stderr}");
}
