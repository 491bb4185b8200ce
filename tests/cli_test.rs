use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// The loader binary with its config directory pointed at `config_home`.
fn loader_with_config(config_home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("winsync-loader").unwrap();
    // On Unix the config dir is derived from these.
    cmd.env("XDG_CONFIG_HOME", config_home).env("HOME", config_home);
    // Keep the user's own settings out of the picture.
    for key in [
        "WINSYNC_PACKAGE",
        "WINSYNC_MODULE",
        "WINSYNC_PYTHON_EXE",
        "WINSYNC_PYTHON_HOME",
        "WINSYNC_NEW_CONSOLE",
        "WINSYNC_LOG_LEVEL",
        "WINSYNC_LOG_FILE",
        "RUST_LOG",
    ] {
        cmd.env_remove(key);
    }
    cmd
}

/// The loader binary with an empty config directory. Keep the returned
/// directory alive for as long as the command runs.
fn loader() -> (Command, TempDir) {
    let config_home = tempfile::tempdir().unwrap();
    (loader_with_config(config_home.path()), config_home)
}

#[test]
fn dry_run_prints_the_module_command_line() {
    let home = tempfile::tempdir().unwrap();

    let (mut cmd, _config_home) = loader();
    cmd.arg("--dry-run")
        .arg("--python-home")
        .arg(home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("python.exe -m winsync.run"));
}

#[test]
fn module_and_forwarded_args_come_from_the_command_line() {
    let home = tempfile::tempdir().unwrap();

    let (mut cmd, _config_home) = loader();
    cmd.args(["--dry-run", "--module", "winsync.record", "--python-home"])
        .arg(home.path())
        .args(["--", "--profile", "lab machines"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"-m winsync.record --profile "lab machines""#,
        ));
}

#[test]
fn python_home_can_come_from_the_environment() {
    let home = tempfile::tempdir().unwrap();

    let (mut cmd, _config_home) = loader();
    cmd.env("WINSYNC_PYTHON_HOME", home.path())
        .env("WINSYNC_PYTHON_EXE", "pythonw.exe")
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("pythonw.exe -m winsync.run"));
}

#[test]
fn log_file_receives_debug_output() {
    let home = tempfile::tempdir().unwrap();
    let log = home.path().join("loader.log");

    let (mut cmd, _config_home) = loader();
    cmd.env("WINSYNC_LOG_FILE", &log)
        .args(["--verbose", "--dry-run", "--python-home"])
        .arg(home.path())
        .assert()
        .success();

    let text = std::fs::read_to_string(&log).unwrap();
    assert!(text.contains("configuration loaded"));
}

#[cfg(not(windows))]
#[test]
fn registry_scan_fails_off_windows() {
    let (mut cmd, _config_home) = loader();
    cmd.assert()
        .code(255)
        .stderr(predicate::str::contains("registry is not available"))
        .stderr(predicate::str::contains("ERROR"));
}

#[cfg(unix)]
#[test]
fn missing_interpreter_reports_create_process() {
    let home = tempfile::tempdir().unwrap();

    let (mut cmd, _config_home) = loader();
    cmd.arg("--python-home")
        .arg(home.path())
        .assert()
        .code(2)
        .stderr(predicate::str::contains("CreateProcess failed with error 2"));
}

#[cfg(target_os = "linux")]
#[test]
fn rc_file_in_the_config_dir_is_read() {
    let config_home = tempfile::tempdir().unwrap();
    let rc_dir = config_home.path().join("winsync");
    std::fs::create_dir_all(&rc_dir).unwrap();
    std::fs::write(rc_dir.join("loader.rc"), "WINSYNC_MODULE=winsync.gui\n").unwrap();
    let home = tempfile::tempdir().unwrap();

    loader_with_config(config_home.path())
        .args(["--dry-run", "--python-home"])
        .arg(home.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("-m winsync.gui"));
}
