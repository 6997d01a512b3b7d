#![cfg(target_os = "linux")]

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

fn arena() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_arena"));
    cmd.env("RUST_LOG", "warn")
        .env_remove("GUESS_SECRET")
        .env_remove("GUESS_MAX_GUESSES")
        .env_remove("GUESS_VERDICT_FD")
        .arg("--no-cgroup");
    cmd
}

fn with_contestants(cmd: &mut Command) -> &mut Command {
    cmd.arg("--judge")
        .arg(env!("CARGO_BIN_EXE_judger"))
        .arg("--player")
        .arg(env!("CARGO_BIN_EXE_player"))
}

fn json_report(cmd: &mut Command, code: i32) -> Value {
    let out = cmd
        .args(["--format", "json"])
        .assert()
        .code(code)
        .get_output()
        .stdout
        .clone();
    serde_json::from_slice(&out).expect("arena must print one JSON report")
}

#[test]
fn player_finds_default_secret() {
    let report = json_report(with_contestants(&mut arena()), 0);
    assert_eq!(report["outcome"], "verdict");
    assert_eq!(report["raw_verdict"], "{\"status\":\"AC\"}");
    assert_eq!(report["verdict"]["status"], "AC");
    assert_eq!(report["judge"]["exit"]["code"], 0);
    assert_eq!(report["player"]["exit"]["code"], 0);
    assert!(report["judge"]["stats"].is_null());
}

#[test]
fn player_finds_range_edges() {
    for secret in ["1", "1000"] {
        let mut cmd = arena();
        with_contestants(&mut cmd).arg(format!("--judge-arg=--secret={secret}"));
        let report = json_report(&mut cmd, 0);
        assert_eq!(report["verdict"]["status"], "AC", "secret {secret}");
    }
}

#[test]
fn secret_outside_range_is_wrong_answer() {
    let mut cmd = arena();
    with_contestants(&mut cmd).args(["--judge-arg", "--secret=5000"]);
    let report = json_report(&mut cmd, 0);
    assert_eq!(report["verdict"]["status"], "WA");
    assert_eq!(report["verdict"]["reason"], "limit");
}

#[test]
fn garbage_player_is_runtime_error() {
    let mut cmd = arena();
    cmd.arg("--judge")
        .arg(env!("CARGO_BIN_EXE_judger"))
        .args(["--player", "sh", "--player-arg", "-c", "--player-arg", "echo abc; cat >/dev/null"]);
    let report = json_report(&mut cmd, 0);
    assert_eq!(report["verdict"]["status"], "RE");
    assert_eq!(report["verdict"]["reason"], "bad input");
}

#[test]
fn player_quitting_mid_game_is_runtime_error() {
    let mut cmd = arena();
    cmd.arg("--judge")
        .arg(env!("CARGO_BIN_EXE_judger"))
        .args(["--player", "sh", "--player-arg", "-c", "--player-arg", "echo 5"]);
    let report = json_report(&mut cmd, 0);
    assert_eq!(report["outcome"], "verdict");
    assert_eq!(report["verdict"]["status"], "RE");
    assert_eq!(report["judge"]["exit"]["code"], 0);
}

#[test]
fn text_report_mirrors_verdict_line() {
    with_contestants(&mut arena())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("[arena] result: {\"status\":\"AC\"}\n"))
        .stdout(predicate::str::contains("[stats] player"));
}

#[test]
fn hanging_judge_times_out() {
    arena()
        .args(["--judge", "sh", "--judge-arg", "-c", "--judge-arg", "exec sleep 30"])
        .arg("--player")
        .arg(env!("CARGO_BIN_EXE_player"))
        .args(["--timeout", "300"])
        .assert()
        .code(3)
        .stdout(predicate::str::starts_with("[arena] timeout\n"))
        .stdout(predicate::str::contains("killed at deadline"));
}

#[test]
fn silent_judge_is_no_verdict() {
    arena()
        .args(["--judge", "sh", "--judge-arg", "-c", "--judge-arg", "exit 0"])
        .arg("--player")
        .arg(env!("CARGO_BIN_EXE_player"))
        .assert()
        .code(4)
        .stdout(predicate::str::starts_with("[arena] no verdict\n"));
}

#[test]
fn missing_judge_binary_is_internal_error() {
    arena()
        .args(["--judge", "/definitely/missing/judge"])
        .arg("--player")
        .arg(env!("CARGO_BIN_EXE_player"))
        .assert()
        .code(2)
        .stderr(predicate::str::contains("failed to spawn judge"));
}
