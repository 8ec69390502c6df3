//! Integration tests for the `avd` binary entry point.
//!
//! Covers usage errors, launch failures, and the happy paths of `list` and
//! `boot` against shell-script stand-ins for the emulator.

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use tempfile::TempDir;

#[test]
fn missing_command_exits_with_failure() {
    let mut command = cargo_bin_cmd!("avd");
    command.assert().failure();
}

#[test]
fn boot_with_missing_binary_reports_failure() {
    let dir = TempDir::new().expect("temp dir");
    let mut command = cargo_bin_cmd!("avd");
    command
        .current_dir(dir.path())
        .arg("--emulator-path")
        .arg(dir.path().join("no-such-emulator"))
        .arg("--log-dir")
        .arg(dir.path())
        .args(["boot", "Pixel_4_API_30"]);
    command
        .assert()
        .failure()
        .stderr(contains("failed to boot"));
    assert!(!dir.path().join("Pixel_4_API_30.log").exists());
}

#[cfg(unix)]
mod scripted {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::PathBuf;

    use super::*;

    fn fake_emulator(dir: &TempDir, body: &str) -> PathBuf {
        let path = dir.path().join("emulator");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod script");
        path
    }

    #[test]
    fn list_prints_known_devices() {
        let dir = TempDir::new().expect("temp dir");
        let binary = fake_emulator(&dir, "printf 'Pixel_4_API_30\\n\\nPixel_5_API_31\\n'");
        let mut command = cargo_bin_cmd!("avd");
        command
            .current_dir(dir.path())
            .arg("--emulator-path")
            .arg(&binary)
            .arg("list");
        command
            .assert()
            .success()
            .stdout("Pixel_4_API_30\nPixel_5_API_31\n");
    }

    #[test]
    fn boot_prints_ready_once_marker_appears() {
        let dir = TempDir::new().expect("temp dir");
        let binary = fake_emulator(
            &dir,
            "echo 'emulator: INFO: Adb connected, start proxing data'\nexit 0",
        );
        let mut command = cargo_bin_cmd!("avd");
        command
            .current_dir(dir.path())
            .arg("--headless")
            .arg("--emulator-path")
            .arg(&binary)
            .arg("--poll-interval-ms=20")
            .args(["boot", "Pixel_4_API_30", "--port", "5554"]);
        command.assert().success().stdout("ready\n");
        assert!(!dir.path().join("Pixel_4_API_30-5554.log").exists());
    }

    #[test]
    fn boot_prints_captured_output_on_failure() {
        let dir = TempDir::new().expect("temp dir");
        let binary = fake_emulator(&dir, "echo 'PANIC: Unknown AVD name' >&2\nexit 1");
        let mut command = cargo_bin_cmd!("avd");
        command
            .current_dir(dir.path())
            .arg("--emulator-path")
            .arg(&binary)
            .arg("--poll-interval-ms=20")
            .args(["boot", "Pixel_4_API_30"]);
        command
            .assert()
            .failure()
            .stderr(contains("PANIC: Unknown AVD name"));
    }
}
