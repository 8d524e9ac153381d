//! Capturing dispatcher for tests.
//!
//! `RecordingDispatcher` implements [`Dispatcher`] without touching the
//! system. Every operation is recorded as a [`DispatchCall`] and answered
//! with one successful [`TargetResult`] per target; published events are
//! kept in order.
//!
//! # Example
//!
//! ```
//! use stepgate::dispatch::{DispatchCall, DispatchOptions, Dispatcher, RecordingDispatcher};
//!
//! let mut dispatcher = RecordingDispatcher::new();
//! let results = dispatcher
//!     .run_command(&["web".to_string()], "uptime", &DispatchOptions::default())
//!     .unwrap();
//!
//! assert_eq!(results.targets(), vec!["web"]);
//! assert!(matches!(&dispatcher.calls()[0], DispatchCall::Command { command, .. } if command == "uptime"));
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde_json::json;

use super::{
    describe, DispatchOptions, Dispatcher, Event, Params, ResultSet, TargetParams, TargetResult,
};
use crate::error::{Result, StepgateError};

/// A dispatcher operation captured by [`RecordingDispatcher`].
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchCall {
    Command {
        targets: Vec<String>,
        command: String,
    },
    Script {
        targets: Vec<String>,
        script: PathBuf,
        arguments: Vec<String>,
    },
    Task {
        targets: Vec<String>,
        task: String,
        params: Params,
    },
    TaskWith {
        task: String,
        mapping: TargetParams,
    },
    Upload {
        targets: Vec<String>,
        source: PathBuf,
        destination: String,
    },
    Download {
        targets: Vec<String>,
        source: String,
        destination: PathBuf,
    },
}

/// Dispatcher that records operations instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingDispatcher {
    calls: Vec<DispatchCall>,
    events: Vec<Event>,
    failing_targets: BTreeSet<String>,
}

impl RecordingDispatcher {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation report failure on `target`.
    pub fn fail_on(&mut self, target: &str) {
        self.failing_targets.insert(target.to_string());
    }

    /// Operations received, in order.
    pub fn calls(&self) -> &[DispatchCall] {
        &self.calls
    }

    /// Events received, in order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Text of every message and verbose event, in order.
    pub fn narration(&self) -> Vec<String> {
        self.events
            .iter()
            .filter_map(Event::text)
            .map(str::to_string)
            .collect()
    }

    /// Check if any narration line contains `text`.
    pub fn has_narration(&self, text: &str) -> bool {
        self.events
            .iter()
            .filter_map(Event::text)
            .any(|m| m.contains(text))
    }

    /// Clear all captured calls and events.
    pub fn clear(&mut self) {
        self.calls.clear();
        self.events.clear();
    }

    fn answer<'t>(
        &self,
        targets: impl IntoIterator<Item = &'t String>,
        action: &str,
        object: &str,
        description: String,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        let results: ResultSet = targets
            .into_iter()
            .map(|target| {
                if self.failing_targets.contains(target) {
                    TargetResult::failure(
                        target,
                        action,
                        object,
                        json!({"error": "recorded failure"}),
                    )
                } else {
                    TargetResult::success(target, action, object, json!({}))
                }
            })
            .collect();

        if !results.ok() && !options.catch_errors {
            return Err(StepgateError::ActionFailed {
                description,
                failed: results.failure_count(),
            });
        }
        Ok(results)
    }
}

impl Dispatcher for RecordingDispatcher {
    fn run_command(
        &mut self,
        targets: &[String],
        command: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.calls.push(DispatchCall::Command {
            targets: targets.to_vec(),
            command: command.to_string(),
        });
        let description = options.description_or(|| describe::command(command));
        self.answer(targets, "command", command, description, options)
    }

    fn run_script(
        &mut self,
        targets: &[String],
        script: &Path,
        arguments: &[String],
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.calls.push(DispatchCall::Script {
            targets: targets.to_vec(),
            script: script.to_path_buf(),
            arguments: arguments.to_vec(),
        });
        let object = script.display().to_string();
        let description = options.description_or(|| describe::script(script));
        self.answer(targets, "script", &object, description, options)
    }

    fn run_task(
        &mut self,
        targets: &[String],
        task: &str,
        params: &Params,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.calls.push(DispatchCall::Task {
            targets: targets.to_vec(),
            task: task.to_string(),
            params: params.clone(),
        });
        let description = options.description_or(|| describe::task(task));
        self.answer(targets, "task", task, description, options)
    }

    fn run_task_with(
        &mut self,
        task: &str,
        mapping: &TargetParams,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.calls.push(DispatchCall::TaskWith {
            task: task.to_string(),
            mapping: mapping.clone(),
        });
        let description = options.description_or(|| describe::task(task));
        self.answer(mapping.keys(), "task", task, description, options)
    }

    fn upload_file(
        &mut self,
        targets: &[String],
        source: &Path,
        destination: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.calls.push(DispatchCall::Upload {
            targets: targets.to_vec(),
            source: source.to_path_buf(),
            destination: destination.to_string(),
        });
        let object = source.display().to_string();
        let description = options.description_or(|| describe::upload(source, destination));
        self.answer(targets, "upload", &object, description, options)
    }

    fn download_file(
        &mut self,
        targets: &[String],
        source: &str,
        destination: &Path,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.calls.push(DispatchCall::Download {
            targets: targets.to_vec(),
            source: source.to_string(),
            destination: destination.to_path_buf(),
        });
        let description = options.description_or(|| describe::download(source, destination));
        self.answer(targets, "download", source, description, options)
    }

    fn publish_event(&mut self, event: Event) {
        self.events.push(event);
    }
}
