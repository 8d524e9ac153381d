//! Dispatchers: the objects plan steps use to perform side effects.
//!
//! This module provides:
//!
//! - [`Dispatcher`] - the capability set every dispatcher exposes
//! - [`LocalDispatcher`] - runs commands, scripts, tasks and file
//!   transfers against local targets
//! - [`SuppressingDispatcher`] - wraps another dispatcher and replaces every
//!   operation with a narrated no-op
//! - [`ActiveDispatcher`] - whichever of the two is currently visible to
//!   plan code
//! - [`RecordingDispatcher`] - captures calls and events for tests
//!
//! # Example
//!
//! ```
//! use stepgate::dispatch::{
//!     DispatchOptions, Dispatcher, Event, RecordingDispatcher, SuppressingDispatcher,
//! };
//!
//! let mut real = RecordingDispatcher::new();
//! let mut suppressed = SuppressingDispatcher::new(&mut real);
//!
//! let results = suppressed
//!     .run_command(&["web".to_string()], "make deploy", &DispatchOptions::default())
//!     .unwrap();
//! assert!(results.is_empty());
//!
//! assert!(real.calls().is_empty());
//! assert_eq!(
//!     real.events(),
//!     &[Event::message("# command 'make deploy' - SKIPPED")]
//! );
//! ```

pub mod active;
pub mod event;
pub mod local;
pub mod recording;
pub mod result;
pub mod suppressing;

pub use active::ActiveDispatcher;
pub use event::Event;
pub use local::LocalDispatcher;
pub use recording::{DispatchCall, RecordingDispatcher};
pub use result::{ResultSet, TargetResult, TargetStatus};
pub use suppressing::SuppressingDispatcher;

use crate::error::Result;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// Named parameters passed to a task.
pub type Params = BTreeMap<String, Value>;

/// Per-target task parameters, keyed by target name.
pub type TargetParams = BTreeMap<String, Params>;

/// Options shared by every run and transfer operation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DispatchOptions {
    /// Human-readable description used in narration instead of the default.
    pub description: Option<String>,

    /// Return failed results instead of an error when a target fails.
    pub catch_errors: bool,
}

impl DispatchOptions {
    /// Options carrying only a description.
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Default::default()
        }
    }

    /// The configured description, or `fallback` when none was supplied.
    pub fn description_or(&self, fallback: impl FnOnce() -> String) -> String {
        self.description.clone().unwrap_or_else(fallback)
    }
}

/// Default narration text for each kind of operation.
pub mod describe {
    use std::path::Path;

    /// `command '<command>'`
    pub fn command(command: &str) -> String {
        format!("command '{}'", command)
    }

    /// `script <path>`
    pub fn script(script: &Path) -> String {
        format!("script {}", script.display())
    }

    /// `task <name>`
    pub fn task(task: &str) -> String {
        format!("task {}", task)
    }

    /// `file upload from <source> to <destination>`
    pub fn upload(source: &Path, destination: &str) -> String {
        format!("file upload from {} to {}", source.display(), destination)
    }

    /// `file download from <source> to <destination>`
    pub fn download(source: &str, destination: &Path) -> String {
        format!(
            "file download from {} to {}",
            source,
            destination.display()
        )
    }
}

/// The capability set plan steps use to affect the outside world.
///
/// Every run and transfer operation returns one [`TargetResult`] per
/// target it touched. Implementations decide how failures surface: the
/// [`LocalDispatcher`] returns an error unless
/// [`DispatchOptions::catch_errors`] is set.
pub trait Dispatcher {
    /// Run a shell command on each target.
    fn run_command(
        &mut self,
        targets: &[String],
        command: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet>;

    /// Run a script with arguments on each target.
    fn run_script(
        &mut self,
        targets: &[String],
        script: &Path,
        arguments: &[String],
        options: &DispatchOptions,
    ) -> Result<ResultSet>;

    /// Run a named task with the same parameters on each target.
    fn run_task(
        &mut self,
        targets: &[String],
        task: &str,
        params: &Params,
        options: &DispatchOptions,
    ) -> Result<ResultSet>;

    /// Run a named task with per-target parameters.
    fn run_task_with(
        &mut self,
        task: &str,
        mapping: &TargetParams,
        options: &DispatchOptions,
    ) -> Result<ResultSet>;

    /// Copy a local file or directory to each target.
    fn upload_file(
        &mut self,
        targets: &[String],
        source: &Path,
        destination: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet>;

    /// Copy a file or directory from each target to a local directory.
    fn download_file(
        &mut self,
        targets: &[String],
        source: &str,
        destination: &Path,
        options: &DispatchOptions,
    ) -> Result<ResultSet>;

    /// Publish a narration event on this dispatcher's event channel.
    fn publish_event(&mut self, event: Event);
}

impl<D: Dispatcher + ?Sized> Dispatcher for &mut D {
    fn run_command(
        &mut self,
        targets: &[String],
        command: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        (**self).run_command(targets, command, options)
    }

    fn run_script(
        &mut self,
        targets: &[String],
        script: &Path,
        arguments: &[String],
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        (**self).run_script(targets, script, arguments, options)
    }

    fn run_task(
        &mut self,
        targets: &[String],
        task: &str,
        params: &Params,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        (**self).run_task(targets, task, params, options)
    }

    fn run_task_with(
        &mut self,
        task: &str,
        mapping: &TargetParams,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        (**self).run_task_with(task, mapping, options)
    }

    fn upload_file(
        &mut self,
        targets: &[String],
        source: &Path,
        destination: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        (**self).upload_file(targets, source, destination, options)
    }

    fn download_file(
        &mut self,
        targets: &[String],
        source: &str,
        destination: &Path,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        (**self).download_file(targets, source, destination, options)
    }

    fn publish_event(&mut self, event: Event) {
        (**self).publish_event(event)
    }
}
