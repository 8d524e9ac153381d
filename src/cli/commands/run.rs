//! Run command implementation.
//!
//! The `stepgate run` command executes a plan file step by step. With
//! `--start-at-step` every step before the named one is narrated but its
//! actions are skipped.

use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::cli::args::{parse_param, RunArgs};
use crate::dispatch::LocalDispatcher;
use crate::error::{Result, StepgateError};
use crate::plan::{load_plan, PlanConfig};
use crate::runner::{execute_plan, plan_scope, PlanRun, START_AT_STEP};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The run command implementation.
pub struct RunCommand {
    project_root: PathBuf,
    args: RunArgs,
}

impl RunCommand {
    /// Create a new run command.
    pub fn new(project_root: &Path, args: RunArgs) -> Self {
        Self {
            project_root: project_root.to_path_buf(),
            args,
        }
    }

    /// Get the project root path.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    /// Get the command arguments.
    pub fn args(&self) -> &RunArgs {
        &self.args
    }

    /// Absolute path of the plan file.
    pub fn plan_path(&self) -> PathBuf {
        if self.args.plan.is_absolute() {
            self.args.plan.clone()
        } else {
            self.project_root.join(&self.args.plan)
        }
    }

    /// Bindings for the command-line scope frame.
    fn overrides(&self) -> Result<BTreeMap<String, Value>> {
        let mut overrides = BTreeMap::new();
        for raw in &self.args.params {
            let (key, value) = parse_param(raw)?;
            overrides.insert(key, value);
        }
        if let Some(step) = &self.args.start_at_step {
            overrides.insert(START_AT_STEP.to_string(), Value::from(step.as_str()));
        }
        Ok(overrides)
    }
}

fn plan_title(plan: &PlanConfig, path: &Path) -> String {
    plan.name.clone().unwrap_or_else(|| {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "plan".to_string())
    })
}

impl Command for RunCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let overrides = match self.overrides() {
            Ok(o) => o,
            Err(e @ StepgateError::InvalidParameter { .. }) => {
                ui.error(&e.to_string());
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let path = self.plan_path();
        let plan = match load_plan(&path) {
            Ok(p) => p,
            Err(StepgateError::PlanNotFound { .. }) => {
                ui.error(&format!("No plan found at {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        let mut scope = plan_scope(&plan, overrides);

        ui.show_header(&format!("Running plan: {}", plan_title(&plan, &path)));

        if plan.steps.is_empty() {
            ui.warning("Plan has no steps");
            return Ok(CommandResult::success());
        }

        let (report, resume_step) = {
            let dispatcher = LocalDispatcher::for_plan(&mut *ui, &self.project_root, &plan);
            let mut run = PlanRun::new(dispatcher);
            let report = execute_plan(&plan, &mut run, &mut scope)?;
            let resume_step = run
                .gate()
                .config()
                .and_then(|c| c.resume_step())
                .map(str::to_string);
            (report, resume_step)
        };

        if let Some(step) = resume_step {
            if report.all_suppressed() {
                ui.warning(&format!(
                    "Step \"{}\" was never reached; every step was skipped",
                    step
                ));
            } else {
                ui.verbose(&format!("Resumed at step \"{}\"", step));
            }
        }

        ui.success(&format!(
            "Plan complete: {} step(s) run, {} skipped",
            report.executed_count(),
            report.suppressed_count()
        ));

        Ok(CommandResult::success())
    }
}
