use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn brief_eval_prints_recorded_results() {
    let mut cmd = Command::cargo_bin("brief").expect("binary exists");
    cmd.arg("eval").arg("2 3 + .");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("5"));
}

#[test]
fn brief_run_executes_script_lines() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("demo.joy");
    fs::write(&script, "3 4 * .\n\"done\" putchars\n").expect("write script");

    let mut cmd = Command::cargo_bin("brief").expect("binary exists");
    cmd.arg("run").arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("12"))
        .stdout(predicate::str::contains("done"));
}

#[test]
fn brief_run_reports_diagnostics_on_stderr() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("broken.joy");
    fs::write(&script, "5 0 / .\n").expect("write script");

    let mut cmd = Command::cargo_bin("brief").expect("binary exists");
    cmd.arg("run").arg(&script);
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0"))
        .stderr(predicate::str::contains("divisor for '/' must not be 0"));
}

#[test]
fn brief_run_loads_a_libra_library_silently() {
    let dir = tempdir().expect("create temp dir");
    let script = dir.path().join("samplelib.joy");
    fs::write(
        &script,
        "(* simple sample library *)\nLIBRA\n    double == 2 *;\n    quad == double double.\n",
    )
    .expect("write library");

    let mut cmd = Command::cargo_bin("brief").expect("binary exists");
    cmd.arg("run").arg(&script);
    cmd.assert().success().stderr(predicate::str::is_empty());
}
