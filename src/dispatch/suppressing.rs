//! Dispatcher wrapper that turns every operation into a narrated no-op.

use std::path::Path;

use tracing::debug;

use super::{describe, DispatchOptions, Dispatcher, Event, Params, ResultSet, TargetParams};
use crate::error::Result;

/// Suffix appended to narration emitted while suppressed.
pub const SKIPPED_SUFFIX: &str = " - SKIPPED";

/// Wraps a dispatcher and suppresses all of its side effects.
///
/// Each run or transfer operation publishes `# <description> - SKIPPED`
/// through the wrapped dispatcher and returns an empty, successful
/// [`ResultSet`]. Narration events get the same suffix; other events pass
/// through untouched.
///
/// The wrapper borrows the dispatcher it wraps and holds no other state,
/// so it can be created and dropped freely at step boundaries.
pub struct SuppressingDispatcher<'a> {
    wrapped: &'a mut dyn Dispatcher,
}

impl<'a> SuppressingDispatcher<'a> {
    /// Wrap `wrapped`.
    pub fn new(wrapped: &'a mut dyn Dispatcher) -> Self {
        Self { wrapped }
    }

    /// The dispatcher this wrapper suppresses.
    pub fn real_dispatcher(&mut self) -> &mut (dyn Dispatcher + 'a) {
        &mut *self.wrapped
    }

    /// Give back the wrapped dispatcher, ending suppression.
    pub fn into_inner(self) -> &'a mut dyn Dispatcher {
        self.wrapped
    }

    fn skip(&mut self, description: String) -> Result<ResultSet> {
        debug!("Suppressed {}", description);
        self.wrapped
            .publish_event(Event::message(format!("# {}{}", description, SKIPPED_SUFFIX)));
        Ok(ResultSet::empty())
    }
}

impl Dispatcher for SuppressingDispatcher<'_> {
    fn run_command(
        &mut self,
        _targets: &[String],
        command: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.skip(options.description_or(|| describe::command(command)))
    }

    fn run_script(
        &mut self,
        _targets: &[String],
        script: &Path,
        _arguments: &[String],
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.skip(options.description_or(|| describe::script(script)))
    }

    fn run_task(
        &mut self,
        _targets: &[String],
        task: &str,
        _params: &Params,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.skip(options.description_or(|| describe::task(task)))
    }

    fn run_task_with(
        &mut self,
        task: &str,
        _mapping: &TargetParams,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.skip(options.description_or(|| describe::task(task)))
    }

    fn upload_file(
        &mut self,
        _targets: &[String],
        source: &Path,
        destination: &str,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.skip(options.description_or(|| describe::upload(source, destination)))
    }

    fn download_file(
        &mut self,
        _targets: &[String],
        source: &str,
        destination: &Path,
        options: &DispatchOptions,
    ) -> Result<ResultSet> {
        self.skip(options.description_or(|| describe::download(source, destination)))
    }

    fn publish_event(&mut self, event: Event) {
        self.wrapped.publish_event(event.with_suffix(SKIPPED_SUFFIX));
    }
}
