//! Integration tests for the stepgate binary.
// The cargo_bin function is marked deprecated in favor of cargo_bin! macro,
// but both work correctly. Suppressing until assert_cmd stabilizes the new API.
#![allow(deprecated)]

use assert_cmd::cargo::cargo_bin;
use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn setup_project(plan: &str) -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("plan.yml"), plan).unwrap();
    temp
}

fn stepgate(temp: &TempDir) -> Command {
    let mut cmd = Command::new(cargo_bin("stepgate"));
    cmd.current_dir(temp.path())
        .env("NO_COLOR", "1")
        .env_remove("STEPGATE_START_AT_STEP")
        .env_remove("RUST_LOG");
    cmd
}

const PLAN: &str = r#"
name: release
steps:
  - name: build
    actions:
      - action: run_command
        command: echo build > build.out
      - action: message
        message: build finished
  - name: test
    actions:
      - action: run_command
        command: echo test > test.out
  - name: publish
    actions:
      - action: message
        message: published
"#;

#[test]
fn help_lists_subcommands() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stepgate"));
    cmd.arg("--help");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("run"))
        .stdout(predicate::str::contains("list"));
    Ok(())
}

#[test]
fn version_flag() -> Result<(), Box<dyn std::error::Error>> {
    let mut cmd = Command::new(cargo_bin("stepgate"));
    cmd.arg("--version");
    cmd.assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
    Ok(())
}

#[test]
fn run_without_plan_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("stepgate"));
    cmd.current_dir(temp.path()).arg("run");
    cmd.assert()
        .code(2)
        .stderr(predicate::str::contains("No plan found"));
    Ok(())
}

#[test]
fn run_executes_all_steps() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan Step: \"build\""))
        .stdout(predicate::str::contains("build finished"))
        .stdout(predicate::str::contains("SKIPPED").not())
        .stdout(predicate::str::contains("3 step(s) run, 0 skipped"));

    assert!(temp.path().join("build.out").exists());
    assert!(temp.path().join("test.out").exists());
    Ok(())
}

#[test]
fn no_subcommand_runs_plan() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan Step: \"publish\""));
    Ok(())
}

#[test]
fn start_at_step_skips_earlier_steps() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .args(["run", "--start-at-step", "test"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan Step: \"build\""))
        .stdout(predicate::str::contains(
            "# command 'echo build > build.out' - SKIPPED",
        ))
        .stdout(predicate::str::contains("build finished - SKIPPED"))
        .stdout(predicate::str::contains("Plan Step: \"test\""))
        .stdout(predicate::str::contains("2 step(s) run, 1 skipped"));

    assert!(!temp.path().join("build.out").exists());
    assert!(temp.path().join("test.out").exists());
    Ok(())
}

#[test]
fn start_at_step_from_environment() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .env("STEPGATE_START_AT_STEP", "publish")
        .arg("run")
        .assert()
        .success()
        .stdout(predicate::str::contains("1 step(s) run, 2 skipped"));

    assert!(!temp.path().join("test.out").exists());
    Ok(())
}

#[test]
fn unknown_step_skips_everything() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .args(["run", "--start-at-step", "Publish"])
        .assert()
        .success()
        .stdout(predicate::str::contains("published - SKIPPED"))
        .stderr(predicate::str::contains("was never reached"));

    assert!(!temp.path().join("build.out").exists());
    Ok(())
}

#[test]
fn params_reach_tasks() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        r#"
tasks:
  greet:
    command: echo "$PT_who" > greeting.out
steps:
  - name: greet
    actions:
      - action: run_task
        task: greet
        params:
          who: world
"#,
    );
    stepgate(&temp).arg("run").assert().success();

    let greeting = fs::read_to_string(temp.path().join("greeting.out"))?;
    assert_eq!(greeting.trim(), "world");
    Ok(())
}

#[test]
fn failing_command_exits_1() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        "steps:\n  - name: broken\n    actions:\n      - action: run_command\n        command: exit 4\n",
    );
    stepgate(&temp)
        .arg("run")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed on 1 target(s)"));
    Ok(())
}

#[test]
fn failing_command_is_skipped_before_resume() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(
        r#"
steps:
  - name: broken
    actions:
      - action: run_command
        command: exit 4
  - name: fine
    actions:
      - action: message
        message: ok
"#,
    );
    stepgate(&temp)
        .args(["run", "--start-at-step", "fine"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# command 'exit 4' - SKIPPED"));
    Ok(())
}

#[test]
fn invalid_param_exits_2() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .args(["run", "--param", "novalue"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("KEY=VALUE"));
    Ok(())
}

#[test]
fn quiet_hides_narration() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .args(["run", "--quiet"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Plan Step").not());
    Ok(())
}

#[test]
fn list_shows_steps() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    stepgate(&temp)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("release"))
        .stdout(predicate::str::contains("  build (2 action(s))"))
        .stdout(predicate::str::contains("  publish (1 action(s))"));
    Ok(())
}

#[test]
fn project_flag_selects_directory() -> Result<(), Box<dyn std::error::Error>> {
    let temp = setup_project(PLAN);
    let elsewhere = TempDir::new()?;
    let mut cmd = Command::new(cargo_bin("stepgate"));
    cmd.current_dir(elsewhere.path())
        .arg("list")
        .arg("--project")
        .arg(temp.path());
    cmd.assert()
        .success()
        .stdout(predicate::str::contains("publish"));
    Ok(())
}
