//! Plan file execution.
//!
//! Walks a [`PlanConfig`] in order, marking each step boundary on a
//! [`PlanRun`] and sending the step's actions through whichever dispatcher
//! the run currently exposes.

use serde_json::Value;
use std::collections::BTreeMap;

use super::run::PlanRun;
use crate::dispatch::{DispatchOptions, Dispatcher, Event, ResultSet};
use crate::error::Result;
use crate::plan::{ActionConfig, PlanConfig, StepConfig};
use crate::scope::{Scope, ScopeChain};

/// What happened to one step.
#[derive(Debug, Clone)]
pub struct StepReport {
    /// Step name.
    pub name: String,

    /// Nesting depth (0 for top-level steps).
    pub depth: usize,

    /// Whether the step's actions were suppressed.
    pub suppressed: bool,

    /// Results of the step's run and transfer actions, in order.
    pub results: Vec<ResultSet>,
}

/// What happened to a whole plan.
#[derive(Debug, Clone, Default)]
pub struct PlanReport {
    /// Every step entered, in execution order.
    pub steps: Vec<StepReport>,
}

impl PlanReport {
    /// Number of steps that ran for real.
    pub fn executed_count(&self) -> usize {
        self.steps.iter().filter(|s| !s.suppressed).count()
    }

    /// Number of steps whose actions were suppressed.
    pub fn suppressed_count(&self) -> usize {
        self.steps.iter().filter(|s| s.suppressed).count()
    }

    /// Whether every step was suppressed.
    pub fn all_suppressed(&self) -> bool {
        !self.steps.is_empty() && self.executed_count() == 0
    }

    /// Look up a step by name (first occurrence).
    pub fn step(&self, name: &str) -> Option<&StepReport> {
        self.steps.iter().find(|s| s.name == name)
    }
}

/// Build the scope chain a plan runs in.
///
/// The outermost frame holds the plan's `parameters`; `overrides` (from the
/// command line) sit in a frame inside it so they take precedence.
pub fn plan_scope(plan: &PlanConfig, overrides: BTreeMap<String, Value>) -> ScopeChain {
    let mut scope = ScopeChain::new(Scope::from_bindings("plan", plan.parameters.clone()));
    scope.push(Scope::from_bindings("cli", overrides));
    scope
}

/// Execute every step of `plan` on `run`.
///
/// Each step gets its own scope frame holding its `vars`. Errors from the
/// dispatcher stop the plan and are returned unchanged.
pub fn execute_plan<D: Dispatcher>(
    plan: &PlanConfig,
    run: &mut PlanRun<D>,
    scope: &mut ScopeChain,
) -> Result<PlanReport> {
    let mut report = PlanReport::default();
    execute_steps(&plan.steps, 0, run, scope, &mut report)?;
    Ok(report)
}

fn execute_steps<D: Dispatcher>(
    steps: &[StepConfig],
    depth: usize,
    run: &mut PlanRun<D>,
    scope: &mut ScopeChain,
    report: &mut PlanReport,
) -> Result<()> {
    for step in steps {
        scope.push(Scope::from_bindings(step.name.clone(), step.vars.clone()));
        let outcome = execute_step(step, depth, run, scope, report);
        scope.pop();
        outcome?;
    }
    Ok(())
}

fn execute_step<D: Dispatcher>(
    step: &StepConfig,
    depth: usize,
    run: &mut PlanRun<D>,
    scope: &mut ScopeChain,
    report: &mut PlanReport,
) -> Result<()> {
    let decision = run.step(scope, &step.name);

    let index = report.steps.len();
    report.steps.push(StepReport {
        name: step.name.clone(),
        depth,
        suppressed: !decision.started,
        results: Vec::new(),
    });

    for action in &step.actions {
        if let Some(results) = dispatch_action(&mut run.dispatcher(), action)? {
            report.steps[index].results.push(results);
        }
    }

    execute_steps(&step.steps, depth + 1, run, scope, report)
}

/// Send one action through `dispatcher`.
///
/// Narration actions publish an event and produce no result set.
pub fn dispatch_action(
    dispatcher: &mut dyn Dispatcher,
    action: &ActionConfig,
) -> Result<Option<ResultSet>> {
    let results = match action {
        ActionConfig::RunCommand {
            command,
            targets,
            description,
            catch_errors,
        } => dispatcher.run_command(targets, command, &options(description, *catch_errors))?,
        ActionConfig::RunScript {
            script,
            arguments,
            targets,
            description,
            catch_errors,
        } => dispatcher.run_script(
            targets,
            script,
            arguments,
            &options(description, *catch_errors),
        )?,
        ActionConfig::RunTask {
            task,
            params,
            targets,
            description,
            catch_errors,
        } => dispatcher.run_task(targets, task, params, &options(description, *catch_errors))?,
        ActionConfig::RunTaskWith {
            task,
            params,
            description,
            catch_errors,
        } => dispatcher.run_task_with(task, params, &options(description, *catch_errors))?,
        ActionConfig::UploadFile {
            source,
            destination,
            targets,
            description,
            catch_errors,
        } => dispatcher.upload_file(
            targets,
            source,
            destination,
            &options(description, *catch_errors),
        )?,
        ActionConfig::DownloadFile {
            source,
            destination,
            targets,
            description,
            catch_errors,
        } => dispatcher.download_file(
            targets,
            source,
            destination,
            &options(description, *catch_errors),
        )?,
        ActionConfig::Message { message } => {
            dispatcher.publish_event(Event::message(message.clone()));
            return Ok(None);
        }
        ActionConfig::Verbose { message } => {
            dispatcher.publish_event(Event::verbose(message.clone()));
            return Ok(None);
        }
    };
    Ok(Some(results))
}

fn options(description: &Option<String>, catch_errors: bool) -> DispatchOptions {
    DispatchOptions {
        description: description.clone(),
        catch_errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::{DispatchCall, RecordingDispatcher};
    use crate::error::StepgateError;
    use crate::plan::parse_plan;
    use std::path::Path;

    const PLAN: &str = r#"
name: deploy
parameters:
  start_at_step: ~
steps:
  - name: build
    actions:
      - action: run_command
        command: make build
      - action: message
        message: built
  - name: migrate
    actions:
      - action: run_task
        task: migrate
        targets: [db]
    steps:
      - name: seed
        actions:
          - action: run_command
            command: ./seed
  - name: release
    actions:
      - action: upload_file
        source: dist
        destination: releases/
        targets: [web]
"#;

    fn plan() -> PlanConfig {
        parse_plan(PLAN, Path::new("plan.yml")).unwrap()
    }

    fn overrides(resume: Option<&str>) -> BTreeMap<String, Value> {
        let mut map = BTreeMap::new();
        if let Some(step) = resume {
            map.insert("start_at_step".to_string(), Value::from(step));
        }
        map
    }

    fn run_plan(resume: Option<&str>) -> (PlanReport, RecordingDispatcher) {
        let plan = plan();
        let mut scope = plan_scope(&plan, overrides(resume));
        let mut run = PlanRun::new(RecordingDispatcher::new());
        let report = execute_plan(&plan, &mut run, &mut scope).unwrap();
        (report, run.into_dispatcher())
    }

    #[test]
    fn full_run_executes_every_action() {
        let (report, recorder) = run_plan(None);

        assert_eq!(report.suppressed_count(), 0);
        assert_eq!(report.executed_count(), 4);
        assert_eq!(recorder.calls().len(), 4);
        assert_eq!(
            recorder.narration(),
            vec![
                "Plan Step: \"build\"",
                "built",
                "Plan Step: \"migrate\"",
                "Plan Step: \"seed\"",
                "Plan Step: \"release\"",
            ]
        );
    }

    #[test]
    fn resume_skips_earlier_steps() {
        let (report, recorder) = run_plan(Some("migrate"));

        assert!(report.step("build").unwrap().suppressed);
        assert!(!report.step("migrate").unwrap().suppressed);
        assert!(!report.step("seed").unwrap().suppressed);
        assert!(!report.step("release").unwrap().suppressed);

        assert_eq!(
            recorder.narration(),
            vec![
                "Plan Step: \"build\"",
                "# command 'make build' - SKIPPED",
                "built - SKIPPED",
                "Plan Step: \"migrate\"",
                "Plan Step: \"seed\"",
                "Plan Step: \"release\"",
            ]
        );
        assert!(matches!(recorder.calls()[0], DispatchCall::Task { .. }));
        assert_eq!(recorder.calls().len(), 3);
    }

    #[test]
    fn suppressed_step_records_empty_results() {
        let (report, _) = run_plan(Some("release"));
        let build = report.step("build").unwrap();
        assert_eq!(build.results.len(), 1);
        assert!(build.results[0].is_empty());
    }

    #[test]
    fn resume_at_nested_step() {
        let (report, recorder) = run_plan(Some("seed"));

        assert!(report.step("migrate").unwrap().suppressed);
        assert!(!report.step("seed").unwrap().suppressed);
        assert_eq!(report.step("seed").unwrap().depth, 1);
        assert_eq!(recorder.calls().len(), 2);
    }

    #[test]
    fn unknown_resume_step_suppresses_all() {
        let (report, recorder) = run_plan(Some("nope"));
        assert!(report.all_suppressed());
        assert!(recorder.calls().is_empty());
    }

    #[test]
    fn cli_override_beats_plan_parameter() {
        let mut plan = plan();
        plan.parameters
            .insert("start_at_step".to_string(), Value::from("release"));

        let mut scope = plan_scope(&plan, overrides(Some("migrate")));
        let mut run = PlanRun::new(RecordingDispatcher::new());
        let report = execute_plan(&plan, &mut run, &mut scope).unwrap();

        assert!(!report.step("migrate").unwrap().suppressed);
    }

    #[test]
    fn step_vars_are_scoped_to_the_step() {
        let plan = parse_plan(
            r#"
steps:
  - name: first
    vars:
      start_at_step: second
  - name: second
"#,
            Path::new("plan.yml"),
        )
        .unwrap();

        let mut scope = plan_scope(&plan, BTreeMap::new());
        let mut run = PlanRun::new(RecordingDispatcher::new());
        let report = execute_plan(&plan, &mut run, &mut scope).unwrap();

        // The first step's frame is where resolution happened
        assert!(report.step("first").unwrap().suppressed);
        assert!(!report.step("second").unwrap().suppressed);
        assert_eq!(scope.depth(), 2);
    }

    #[test]
    fn dispatcher_errors_stop_the_plan() {
        let plan = plan();
        let mut scope = plan_scope(&plan, BTreeMap::new());
        let mut recorder = RecordingDispatcher::new();
        recorder.fail_on("db");
        let mut run = PlanRun::new(&mut recorder);

        let err = execute_plan(&plan, &mut run, &mut scope).unwrap_err();
        assert!(matches!(err, StepgateError::ActionFailed { .. }));
        assert_eq!(scope.depth(), 2);

        drop(run);
        assert!(!recorder.has_narration("release"));
    }
}
