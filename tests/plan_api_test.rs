//! Integration tests for plan loading and execution.

use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::fs;
use stepgate::dispatch::{DispatchCall, LocalDispatcher, RecordingDispatcher};
use stepgate::plan::{load_plan, ActionConfig, LOCALHOST};
use stepgate::runner::{execute_plan, plan_scope, PlanRun, START_AT_STEP};
use stepgate::ui::MockUI;
use stepgate::StepgateError;
use tempfile::TempDir;

const PLAN: &str = r#"
name: site
parameters:
  start_at_step: ~
targets:
  web:
    dir: web
    env:
      STAGE: prod
tasks:
  stamp:
    command: echo "$PT_label:$STAGE" > stamp.txt
steps:
  - name: prepare
    actions:
      - action: run_command
        command: echo prepared > prepared.txt
        targets: [web]
  - name: deploy
    vars:
      label: v2
    actions:
      - action: run_task
        task: stamp
        targets: [web]
        params:
          label: v2
      - action: upload_file
        source: assets
        destination: public/
        targets: [web]
    steps:
      - name: verify
        actions:
          - action: verbose
            message: verifying
"#;

fn project() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("plan.yml"), PLAN).unwrap();
    fs::create_dir_all(temp.path().join("web")).unwrap();
    fs::create_dir_all(temp.path().join("assets")).unwrap();
    fs::write(temp.path().join("assets/app.js"), "console.log(1)").unwrap();
    temp
}

fn resume_at(step: &str) -> BTreeMap<String, Value> {
    BTreeMap::from([(START_AT_STEP.to_string(), json!(step))])
}

#[test]
fn plan_file_loads() {
    let temp = project();
    let plan = load_plan(&temp.path().join("plan.yml")).unwrap();

    assert_eq!(plan.name.as_deref(), Some("site"));
    assert_eq!(plan.step_names(), vec!["prepare", "deploy"]);
    assert_eq!(plan.all_steps().len(), 3);
    assert!(matches!(
        &plan.steps[1].actions[1],
        ActionConfig::UploadFile { destination, .. } if destination == "public/"
    ));
}

#[test]
fn missing_plan_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let err = load_plan(&temp.path().join("plan.yml")).unwrap_err();
    assert!(matches!(err, StepgateError::PlanNotFound { .. }));
}

#[test]
fn recorded_run_resumes_at_nested_step() {
    let temp = project();
    let plan = load_plan(&temp.path().join("plan.yml")).unwrap();
    let mut scope = plan_scope(&plan, resume_at("verify"));
    let mut run = PlanRun::new(RecordingDispatcher::new());

    let report = execute_plan(&plan, &mut run, &mut scope).unwrap();

    assert_eq!(report.suppressed_count(), 2);
    assert_eq!(report.executed_count(), 1);
    assert!(!report.step("verify").unwrap().suppressed);
    assert_eq!(scope.depth(), 2);

    let recorder = run.into_dispatcher();
    assert!(recorder.calls().is_empty());
    assert!(recorder.has_narration("# task stamp - SKIPPED"));
    assert!(recorder.has_narration("verifying"));
    assert!(!recorder.has_narration("verifying - SKIPPED"));
}

#[test]
fn recorded_run_sends_actions_to_targets() {
    let temp = project();
    let plan = load_plan(&temp.path().join("plan.yml")).unwrap();
    let mut scope = plan_scope(&plan, BTreeMap::new());
    let mut run = PlanRun::new(RecordingDispatcher::new());

    execute_plan(&plan, &mut run, &mut scope).unwrap();

    let recorder = run.into_dispatcher();
    assert_eq!(recorder.calls().len(), 3);
    assert!(matches!(
        &recorder.calls()[1],
        DispatchCall::Task { task, targets, .. }
            if task == "stamp" && targets == &["web".to_string()]
    ));
}

#[test]
fn local_run_performs_work_after_resume_point() {
    let temp = project();
    let plan = load_plan(&temp.path().join("plan.yml")).unwrap();
    let mut scope = plan_scope(&plan, resume_at("deploy"));
    let mut ui = MockUI::new();

    let report = {
        let dispatcher = LocalDispatcher::for_plan(&mut ui, temp.path(), &plan);
        let mut run = PlanRun::new(dispatcher);
        execute_plan(&plan, &mut run, &mut scope).unwrap()
    };

    assert_eq!(report.suppressed_count(), 1);
    assert!(!temp.path().join("web/prepared.txt").exists());

    let stamp = fs::read_to_string(temp.path().join("web/stamp.txt")).unwrap();
    assert_eq!(stamp.trim(), "v2:prod");
    assert!(temp.path().join("web/public/assets/app.js").exists());

    assert!(ui.has_message("# command 'echo prepared > prepared.txt' - SKIPPED"));
    assert!(ui.has_message("Plan Step: \"verify\""));
    assert!(ui.has_verbose("verifying"));
}

#[test]
fn localhost_is_implicit() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("plan.yml"),
        "steps:\n  - name: touch\n    actions:\n      - action: run_command\n        command: touch here.txt\n",
    )
    .unwrap();
    let plan = load_plan(&temp.path().join("plan.yml")).unwrap();
    assert!(matches!(
        &plan.steps[0].actions[0],
        ActionConfig::RunCommand { targets, .. } if targets == &[LOCALHOST.to_string()]
    ));

    let mut scope = plan_scope(&plan, BTreeMap::new());
    let mut ui = MockUI::new();
    {
        let mut run = PlanRun::new(LocalDispatcher::for_plan(&mut ui, temp.path(), &plan));
        execute_plan(&plan, &mut run, &mut scope).unwrap();
    }

    assert!(temp.path().join("here.txt").exists());
}
