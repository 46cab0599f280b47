use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;

fn warden() -> Command {
    cargo_bin_cmd!("warden")
}

#[test]
fn test_missing_pid_value_exits_one() {
    warden()
        .args(["--start", "--pid"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("ERROR: Missing argument for --pid"));
}

#[test]
fn test_value_followed_by_flag_exits_one() {
    warden()
        .args(["--chdir", "--stop"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--chdir"));
}

#[test]
fn test_help_prints_daemon_and_server_options() {
    warden()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--restart").and(predicate::str::contains("--port")));
}

#[test]
fn test_version() {
    warden()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("warden "));
}

#[test]
fn test_stop_without_pid_file_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("app.pid");
    warden()
        .args(["--stop", "--pid"])
        .arg(&pid_path)
        .assert()
        .success();
    assert!(!pid_path.exists());
}

#[test]
fn test_start_refused_when_instance_recorded() {
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("app.pid");
    std::fs::write(&pid_path, "12345\n").unwrap();

    warden()
        .args(["--start", "--pid"])
        .arg(&pid_path)
        .assert()
        .code(3);

    assert_eq!(std::fs::read_to_string(&pid_path).unwrap(), "12345\n");
}

#[test]
fn test_corrupt_pid_file_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let pid_path = dir.path().join("app.pid");
    std::fs::write(&pid_path, "not a pid\n").unwrap();

    warden()
        .args(["--stop", "--pid"])
        .arg(&pid_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("invalid PID"));
}

#[test]
fn test_bad_server_argument_propagates_server_exit_code() {
    warden()
        .args(["--no-such-flag"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("--no-such-flag"));
}
