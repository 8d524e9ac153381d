//! List command implementation.
//!
//! The `stepgate list` command prints a plan's steps in execution order,
//! indented by nesting depth. These are the names `--start-at-step` accepts.

use std::path::{Path, PathBuf};

use crate::cli::args::ListArgs;
use crate::error::{Result, StepgateError};
use crate::plan::load_plan;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The list command implementation.
pub struct ListCommand {
    project_root: PathBuf,
    args: ListArgs,
}

impl ListCommand {
    /// Create a new list command.
    pub fn new(project_root: &Path, args: ListArgs) -> Self {
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
    pub fn args(&self) -> &ListArgs {
        &self.args
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let path = self.project_root.join(&self.args.plan);
        let plan = match load_plan(&path) {
            Ok(p) => p,
            Err(StepgateError::PlanNotFound { .. }) => {
                ui.error(&format!("No plan found at {}", path.display()));
                return Ok(CommandResult::failure(2));
            }
            Err(e) => return Err(e),
        };

        if let Some(name) = &plan.name {
            ui.show_header(name);
        }
        if let Some(description) = &plan.description {
            ui.verbose(description);
        }

        let steps = plan.all_steps();
        if steps.is_empty() {
            ui.message("No steps defined.");
            return Ok(CommandResult::success());
        }

        ui.message("Steps:");
        for (depth, step) in steps {
            let indent = "  ".repeat(depth + 1);
            match step.actions.len() {
                0 => ui.message(&format!("{}{}", indent, step.name)),
                n => ui.message(&format!("{}{} ({} action(s))", indent, step.name, n)),
            }
        }

        Ok(CommandResult::success())
    }
}
