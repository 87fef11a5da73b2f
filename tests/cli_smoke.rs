//! Smoke tests for the stepwise binary.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn stepwise(dir: &TempDir) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("stepwise"));
    cmd.current_dir(dir.path()).env("NO_COLOR", "1").env_remove("RUST_LOG");
    cmd
}

fn project(pipeline: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    // Keep config discovery inside the temp directory.
    fs::create_dir(temp.path().join(".git")).unwrap();
    fs::write(temp.path().join("stepwise.toml"), pipeline).unwrap();
    temp
}

const TWO_TASKS: &str = r#"
[[tasks]]
title = "Greet"
command = "echo hello"
capture = "greeting"

[[tasks]]
title = "Shout"
command = "echo \"$STEPWISE_GREETING\" | tr a-z A-Z"
capture = "shout"
"#;

#[cfg(unix)]
#[test]
fn test_run_json_prints_context() {
    let temp = project(TWO_TASKS);

    stepwise(&temp)
        .args(["run", "--json", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""greeting": "hello""#))
        .stdout(predicate::str::contains(r#""shout": "HELLO""#));
}

#[cfg(unix)]
#[test]
fn test_failing_task_exits_with_task_failed_code() {
    let temp = project("[[tasks]]\ntitle = \"Boom\"\ncommand = \"exit 7\"\n");

    stepwise(&temp)
        .args(["run", "--quiet"])
        .assert()
        .code(4)
        .stderr(predicate::str::contains("Boom"))
        .stderr(predicate::str::contains("exited with code 7"));
}

#[test]
fn test_check_lists_tasks() {
    let temp = project(TWO_TASKS);

    stepwise(&temp)
        .arg("check")
        .assert()
        .success()
        .stdout(predicate::str::contains("[1/2] Greet"))
        .stdout(predicate::str::contains("capture → shout"));
}

#[test]
fn test_missing_pipeline_exits_with_pipeline_code() {
    let temp = TempDir::new().unwrap();
    fs::create_dir(temp.path().join(".git")).unwrap();

    stepwise(&temp)
        .args(["check", "absent.toml"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("absent.toml"));
}

#[test]
fn test_invalid_config_exits_with_cli_code() {
    let temp = project(TWO_TASKS);
    fs::create_dir(temp.path().join(".stepwise")).unwrap();
    fs::write(
        temp.path().join(".stepwise").join("config.toml"),
        "[pipeline]\nshell = \"\"\n",
    )
    .unwrap();

    stepwise(&temp).arg("config").assert().code(2);
}

#[test]
fn test_config_json_reports_sources() {
    let temp = project(TWO_TASKS);
    fs::create_dir(temp.path().join(".stepwise")).unwrap();
    fs::write(
        temp.path().join(".stepwise").join("config.toml"),
        "[pipeline]\nshell = \"bash\"\n",
    )
    .unwrap();

    let output = stepwise(&temp)
        .args(["config", "--json", "--no-color"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["values"]["shell"]["value"], "bash");
    assert_eq!(value["values"]["shell"]["source"], "config");
    assert_eq!(value["values"]["color"]["source"], "cli");
}

#[test]
fn test_verbose_and_quiet_are_rejected() {
    let temp = project(TWO_TASKS);

    stepwise(&temp).args(["-v", "-q", "run"]).assert().code(2);
}

#[test]
fn test_verbose_from_config_file_enables_debug_logging() {
    let temp = project(TWO_TASKS);
    fs::create_dir(temp.path().join(".stepwise")).unwrap();
    fs::write(
        temp.path().join(".stepwise/config.toml"),
        "[display]\nverbose = true\n",
    )
    .unwrap();

    stepwise(&temp)
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("Dispatching command"));
}

#[test]
fn test_default_run_has_no_debug_logging() {
    let temp = project(TWO_TASKS);

    stepwise(&temp)
        .arg("check")
        .assert()
        .success()
        .stderr(predicate::str::contains("Dispatching command").not());
}
