use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::io::Write;
use std::process::Stdio;
use tempfile::tempdir;

fn judger() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_judger"));
    cmd.env_remove("GUESS_SECRET")
        .env_remove("GUESS_MAX_GUESSES")
        .env_remove("GUESS_VERDICT_FD")
        .env("RUST_LOG", "warn");
    cmd
}

fn run_with_verdict_file(cmd: &mut Command, stdin: &str) -> (String, String) {
    let dir = tempdir().unwrap();
    let verdict = dir.path().join("verdict.json");
    let output = cmd
        .arg("--verdict-file")
        .arg(&verdict)
        .write_stdin(stdin)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    (
        String::from_utf8(output).unwrap(),
        fs::read_to_string(&verdict).unwrap(),
    )
}

#[test]
fn bad_first_token_reports_runtime_error_and_no_gameplay_line() {
    let (stdout, verdict) = run_with_verdict_file(&mut judger(), "abc\n");
    assert_eq!(stdout, "");
    assert_eq!(verdict, "{\"status\":\"RE\",\"reason\":\"bad input\"}\n");
}

#[test]
fn ten_misses_report_wrong_answer() {
    let (stdout, verdict) = run_with_verdict_file(&mut judger(), &"1\n".repeat(10));
    assert_eq!(stdout, "too small\n".repeat(10));
    assert_eq!(verdict, "{\"status\":\"WA\",\"reason\":\"limit\"}\n");
}

#[test]
fn hit_on_third_try_reports_accepted() {
    let (stdout, verdict) = run_with_verdict_file(&mut judger(), "900\n100\n731\n5\n");
    assert_eq!(stdout, "too large\ntoo small\ncorrect\n");
    assert_eq!(verdict, "{\"status\":\"AC\"}\n");
}

#[test]
fn secret_and_limit_come_from_environment() {
    let mut cmd = judger();
    cmd.env("GUESS_SECRET", "42").env("GUESS_MAX_GUESSES", "2");
    let (stdout, verdict) = run_with_verdict_file(&mut cmd, "41 43 42\n");
    assert_eq!(stdout, "too small\ntoo large\n");
    assert_eq!(verdict, "{\"status\":\"WA\",\"reason\":\"limit\"}\n");
}

#[test]
fn closed_verdict_descriptor_fails_before_reading() {
    judger()
        .args(["--verdict-fd", "4093"])
        .write_stdin("731\n")
        .assert()
        .code(2)
        .stdout("")
        .stderr(predicate::str::contains("verdict channel"));
}

#[test]
fn startup_trace_goes_to_stderr_only() {
    let dir = tempdir().unwrap();
    let verdict = dir.path().join("verdict.json");
    judger()
        .env("RUST_LOG", "info")
        .arg("--verdict-file")
        .arg(&verdict)
        .write_stdin("731\n")
        .assert()
        .success()
        .stdout("correct\n")
        .stderr(predicate::str::contains("Judge debug"));
}

#[test]
fn verdict_file_wins_over_exported_descriptor() {
    let mut cmd = judger();
    cmd.env("GUESS_VERDICT_FD", "3");
    let (stdout, verdict) = run_with_verdict_file(&mut cmd, "731\n");
    assert_eq!(stdout, "correct\n");
    assert_eq!(verdict, "{\"status\":\"AC\"}\n");
}

#[test]
fn closed_reply_stream_still_reports_runtime_error() {
    let dir = tempdir().unwrap();
    let verdict = dir.path().join("verdict.json");
    let mut child = std::process::Command::new(env!("CARGO_BIN_EXE_judger"))
        .env("RUST_LOG", "warn")
        .env_remove("GUESS_VERDICT_FD")
        .arg("--verdict-file")
        .arg(&verdict)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();

    // The reader goes away before the judger answers its first guess.
    drop(child.stdout.take());
    let mut stdin = child.stdin.take().unwrap();
    stdin.write_all(b"5\n731\n").unwrap();
    drop(stdin);

    let status = child.wait().unwrap();
    assert_eq!(status.code(), Some(0));
    assert_eq!(
        fs::read_to_string(&verdict).unwrap(),
        "{\"status\":\"RE\",\"reason\":\"bad input\"}\n"
    );
}
