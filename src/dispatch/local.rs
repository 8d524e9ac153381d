//! Dispatcher that performs real work on local targets.
//!
//! A target is a named working directory with its own environment. The
//! implicit `localhost` target is the project root. Commands, scripts and
//! tasks run through the shell inside the target directory; uploads copy
//! into the target directory and downloads copy out of it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde_json::{json, Value};
use tracing::debug;

use super::{
    describe, DispatchOptions, Dispatcher, Event, Params, ResultSet, TargetParams, TargetResult,
};
use crate::error::{Result, StepgateError};
use crate::plan::{PlanConfig, TargetConfig, TaskConfig, LOCALHOST};
use crate::shell::{execute, CommandOptions, CommandResult};
use crate::ui::UserInterface;

/// A target resolved against the project root.
#[derive(Debug, Clone)]
struct ResolvedTarget {
    name: String,
    dir: PathBuf,
    env: HashMap<String, String>,
}

/// Real dispatcher for local targets.
///
/// Events are rendered on the borrowed [`UserInterface`].
pub struct LocalDispatcher<'ui> {
    ui: &'ui mut dyn UserInterface,
    project_root: PathBuf,
    targets: BTreeMap<String, TargetConfig>,
    tasks: BTreeMap<String, TaskConfig>,
}

impl<'ui> LocalDispatcher<'ui> {
    /// Create a dispatcher with no named targets or tasks.
    pub fn new(ui: &'ui mut dyn UserInterface, project_root: &Path) -> Self {
        Self {
            ui,
            project_root: project_root.to_path_buf(),
            targets: BTreeMap::new(),
            tasks: BTreeMap::new(),
        }
    }

    /// Create a dispatcher using the targets and tasks a plan defines.
    pub fn for_plan(
        ui: &'ui mut dyn UserInterface,
        project_root: &Path,
        plan: &PlanConfig,
    ) -> Self {
        Self {
            ui,
            project_root: project_root.to_path_buf(),
            targets: plan.targets.clone(),
            tasks: plan.tasks.clone(),
        }
    }

    /// Register a named target.
    pub fn add_target(&mut self, name: &str, target: TargetConfig) {
        self.targets.insert(name.to_string(), target);
    }

    /// Register a named task.
    pub fn add_task(&mut self, name: &str, task: TaskConfig) {
        self.tasks.insert(name.to_string(), task);
    }

    fn resolve_target(&self, name: &str) -> Result<ResolvedTarget> {
        let config = match self.targets.get(name) {
            Some(config) => config.clone(),
            None if name == LOCALHOST => TargetConfig::default(),
            None => {
                return Err(StepgateError::UnknownTarget {
                    name: name.to_string(),
                })
            }
        };

        let dir = match config.dir {
            Some(dir) => self.project_root.join(dir),
            None => self.project_root.clone(),
        };

        Ok(ResolvedTarget {
            name: name.to_string(),
            dir,
            env: config.env.into_iter().collect(),
        })
    }

    fn resolve_targets<'n>(
        &self,
        names: impl IntoIterator<Item = &'n String>,
    ) -> Result<Vec<ResolvedTarget>> {
        names.into_iter().map(|n| self.resolve_target(n)).collect()
    }

    fn task(&self, name: &str) -> Result<TaskConfig> {
        self.tasks
            .get(name)
            .cloned()
            .ok_or_else(|| StepgateError::UnknownTask {
                name: name.to_string(),
            })
    }

    /// Run `operation` on every target, bracketed by started/finished events.
    ///
    /// An error from `operation` stops the remaining targets; the finished
    /// event is still published before the error is returned.
    fn on_targets<F>(
        &mut self,
        targets: &[ResolvedTarget],
        description: String,
        options: &DispatchOptions,
        mut operation: F,
    ) -> Result<ResultSet>
    where
        F: FnMut(&ResolvedTarget) -> Result<TargetResult>,
    {
        self.publish_event(Event::ActionStarted {
            description: description.clone(),
            targets: targets.iter().map(|t| t.name.clone()).collect(),
        });

        let mut results = ResultSet::empty();
        let mut error = None;
        for target in targets {
            debug!("Running {} on {}", description, target.name);
            match operation(target) {
                Ok(result) => results.push(result),
                Err(e) => {
                    error = Some(e);
                    break;
                }
            }
        }

        for failed in results.iter().filter(|r| !r.is_ok()) {
            let reason = failed.error_message().unwrap_or("failed").trim().to_string();
            self.ui.warning(&format!("{}: {}", failed.target, reason));
        }

        self.publish_event(Event::ActionFinished {
            description: description.clone(),
            succeeded: results.success_count(),
            failed: results.failure_count(),
        });

        if let Some(e) = error {
            return Err(e);
        }
        if !results.ok() && !options.catch_errors {
            return Err(StepgateError::ActionFailed {
                description,
                failed: results.failure_count(),
            });
        }
        Ok(results)
    }

    fn to_absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }
}

fn shell_options(target: &ResolvedTarget, extra_env: HashMap<String, String>) -> CommandOptions {
    let mut env = target.env.clone();
    env.extend(extra_env);
    CommandOptions {
        cwd: Some(target.dir.clone()),
        env,
    }
}

fn command_value(result: &CommandResult) -> Value {
    json!({
        "stdout": result.stdout,
        "stderr": result.stderr,
        "exit_code": result.exit_code,
    })
}

fn command_result(
    target: &ResolvedTarget,
    action: &str,
    object: &str,
    result: CommandResult,
) -> TargetResult {
    let value = command_value(&result);
    if result.success {
        TargetResult::success(&target.name, action, object, value)
    } else {
        TargetResult::failure(&target.name, action, object, value)
    }
}

/// Task output: a JSON object printed on stdout is the value, anything
/// else is wrapped as `{"_output": ...}`.
fn task_value(result: &CommandResult) -> Value {
    match serde_json::from_str::<Value>(result.stdout.trim()) {
        Ok(Value::Object(map)) => Value::Object(map),
        _ => json!({ "_output": result.stdout }),
    }
}

/// `PT_<name>` environment variables for task parameters.
fn task_env(params: &Params) -> HashMap<String, String> {
    params
        .iter()
        .map(|(key, value)| {
            let rendered = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (format!("PT_{}", key), rendered)
        })
        .collect()
}

fn run_task_on(
    target: &ResolvedTarget,
    name: &str,
    task: &TaskConfig,
    params: &Params,
) -> Result<TargetResult> {
    let result = execute(&task.command, &shell_options(target, task_env(params)))?;
    let mut value = task_value(&result);
    if !result.success {
        if let Value::Object(map) = &mut value {
            map.insert("error".to_string(), Value::from(result.stderr.clone()));
            map.insert("exit_code".to_string(), json!(result.exit_code));
        }
        return Ok(TargetResult::failure(&target.name, "task", name, value));
    }
    Ok(TargetResult::success(&target.name, "task", name, value))
}

fn transfer_result(
    target: &ResolvedTarget,
    action: &str,
    object: &str,
    outcome: io::Result<PathBuf>,
) -> TargetResult {
    match outcome {
        Ok(path) => TargetResult::success(
            &target.name,
            action,
            object,
            json!({ "path": path.display().to_string() }),
        ),
        Err(e) => TargetResult::failure(
            &target.name,
            action,
            object,
            json!({ "error": e.to_string() }),
        ),
    }
}

/// Copy a file or a directory tree from `from` to `to`.
///
/// Entries are inspected with `symlink_metadata`, so links inside the tree
/// are recreated as links rather than followed.
fn copy_path(from: &Path, to: &Path) -> io::Result<()> {
    let file_type = fs::symlink_metadata(from)?.file_type();
    if file_type.is_symlink() {
        copy_link(from, to)
    } else if file_type.is_dir() {
        fs::create_dir_all(to)?;
        for entry in fs::read_dir(from)? {
            let entry = entry?;
            copy_path(&entry.path(), &to.join(entry.file_name()))?;
        }
        Ok(())
    } else {
        if let Some(parent) = to.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::copy(from, to)?;
        Ok(())
    }
}

#[cfg(unix)]
fn copy_link(from: &Path, to: &Path) -> io::Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    std::os::unix::fs::symlink(fs::read_link(from)?, to)
}

#[cfg(not(unix))]
fn copy_link(from: &Path, _to: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        format!("cannot copy symlink {}", from.display()),
    ))
}

/// Canonical form of `path`, which need not exist yet: the longest
/// existing ancestor is canonicalized and the missing tail re-appended.
fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let mut existing = path;
    let mut missing = Vec::new();
    loop {
        match existing.canonicalize() {
            Ok(base) => {
                return Ok(missing.iter().rev().fold(base, |acc, part| acc.join(part)));
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                match (existing.parent(), existing.file_name()) {
                    (Some(parent), Some(name)) => {
                        missing.push(name.to_os_string());
                        existing = parent;
                    }
                    _ => return Err(e),
                }
            }
            Err(e) => return Err(e),
        }
    }
}

/// Copy `source` into `destination`.
///
/// A trailing slash or an existing directory at `destination` places the
/// copy inside it under the source's file name. A destination inside the
/// source directory is refused before anything is written.
fn upload(source: &Path, destination: &Path, into_dir: bool) -> io::Result<PathBuf> {
    if !source.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("{} does not exist", source.display()),
        ));
    }
    let source = source.canonicalize()?;

    let dest = match source.file_name() {
        Some(name) if into_dir || destination.is_dir() => destination.join(name),
        _ => destination.to_path_buf(),
    };

    if source.is_dir() && resolve_path(&dest)?.starts_with(&source) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!(
                "cannot copy {} into itself at {}",
                source.display(),
                dest.display()
            ),
        ));
    }

    copy_path(&source, &dest)?;
    Ok(dest)
}

impl Dispatcher for LocalDispatcher<'_> {
    fn run_command(
        &mut self,
        targets: &[String],
        command: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        let resolved = self.resolve_targets(targets)?;
        let description = options.description_or(|| describe::command(command));

        self.on_targets(&resolved, description, options, |target| {
            let result = execute(command, &shell_options(target, HashMap::new()))?;
            Ok(command_result(target, "command", command, result))
        })
    }

    fn run_script(
        &mut self,
        targets: &[String],
        script: &Path,
        arguments: &[String],
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        let resolved = self.resolve_targets(targets)?;
        let description = options.description_or(|| describe::script(script));
        let object = script.display().to_string();

        let script_path = self.to_absolute(script).display().to_string();
        let command_line = shell_words::join(
            std::iter::once(script_path.as_str()).chain(arguments.iter().map(String::as_str)),
        );

        self.on_targets(&resolved, description, options, |target| {
            let result = execute(&command_line, &shell_options(target, HashMap::new()))?;
            Ok(command_result(target, "script", &object, result))
        })
    }

    fn run_task(
        &mut self,
        targets: &[String],
        task: &str,
        params: &Params,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        let config = self.task(task)?;
        let resolved = self.resolve_targets(targets)?;
        let description = options.description_or(|| describe::task(task));

        self.on_targets(&resolved, description, options, |target| {
            run_task_on(target, task, &config, params)
        })
    }

    fn run_task_with(
        &mut self,
        task: &str,
        mapping: &TargetParams,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        let config = self.task(task)?;
        let resolved = self.resolve_targets(mapping.keys())?;
        let description = options.description_or(|| describe::task(task));

        self.on_targets(&resolved, description, options, |target| {
            let params = mapping.get(&target.name).cloned().unwrap_or_default();
            run_task_on(target, task, &config, &params)
        })
    }

    fn upload_file(
        &mut self,
        targets: &[String],
        source: &Path,
        destination: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        let resolved = self.resolve_targets(targets)?;
        let description = options.description_or(|| describe::upload(source, destination));
        let local_source = self.to_absolute(source);
        let object = source.display().to_string();
        let into_dir = destination.ends_with('/');

        self.on_targets(&resolved, description, options, |target| {
            let outcome = upload(&local_source, &target.dir.join(destination), into_dir);
            Ok(transfer_result(target, "upload", &object, outcome))
        })
    }

    fn download_file(
        &mut self,
        targets: &[String],
        source: &str,
        destination: &Path,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        let resolved = self.resolve_targets(targets)?;
        let description = options.description_or(|| describe::download(source, destination));
        let local_destination = self.to_absolute(destination);

        self.on_targets(&resolved, description, options, |target| {
            // One subdirectory per target
            let outcome = upload(
                &target.dir.join(source),
                &local_destination.join(&target.name),
                true,
            );
            Ok(transfer_result(target, "download", source, outcome))
        })
    }

    fn publish_event(&mut self, event: Event) {
        match &event {
            Event::Message { message } => self.ui.message(message),
            Event::Verbose { message } => self.ui.verbose(message),
            Event::ActionStarted { .. } | Event::ActionFinished { .. } => {
                self.ui.verbose(&event.to_string())
            }
        }
    }
}
