//! The dispatcher currently visible to plan code.

use std::path::Path;

use super::{
    DispatchOptions, Dispatcher, Event, Params, ResultSet, SuppressingDispatcher, TargetParams,
};
use crate::error::Result;

/// Either the real dispatcher or a single suppressing layer over it.
pub enum ActiveDispatcher<'a> {
    /// Operations run for real.
    Live(&'a mut dyn Dispatcher),

    /// Operations are replaced with narrated no-ops.
    Suppressed(SuppressingDispatcher<'a>),
}

impl<'a> ActiveDispatcher<'a> {
    /// Whether operations are currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed(_))
    }

    /// The underlying real dispatcher, bypassing any suppression.
    pub fn real_dispatcher(&mut self) -> &mut (dyn Dispatcher + 'a) {
        match self {
            Self::Live(real) => &mut **real,
            Self::Suppressed(wrapper) => wrapper.real_dispatcher(),
        }
    }

    fn visible(&mut self) -> &mut (dyn Dispatcher + 'a) {
        match self {
            Self::Live(real) => &mut **real,
            Self::Suppressed(wrapper) => wrapper,
        }
    }
}

impl Dispatcher for ActiveDispatcher<'_> {
    fn run_command(
        &mut self,
        targets: &[String],
        command: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.visible().run_command(targets, command, options)
    }

    fn run_script(
        &mut self,
        targets: &[String],
        script: &Path,
        arguments: &[String],
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.visible()
            .run_script(targets, script, arguments, options)
    }

    fn run_task(
        &mut self,
        targets: &[String],
        task: &str,
        params: &Params,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.visible().run_task(targets, task, params, options)
    }

    fn run_task_with(
        &mut self,
        task: &str,
        mapping: &TargetParams,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.visible().run_task_with(task, mapping, options)
    }

    fn upload_file(
        &mut self,
        targets: &[String],
        source: &Path,
        destination: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.visible()
            .upload_file(targets, source, destination, options)
    }

    fn download_file(
        &mut self,
        targets: &[String],
        source: &str,
        destination: &Path,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.visible()
            .download_file(targets, source, destination, options)
    }

    fn publish_event(&mut self, event: Event) {
        self.visible().publish_event(event)
    }
}
