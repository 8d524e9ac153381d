//! Step invocation and dispatcher gating.

use tracing::debug;

use super::gate::{Decision, RunConfig, StepGate};
use crate::dispatch::{ActiveDispatcher, Dispatcher, Event, ResultSet, SuppressingDispatcher};
use crate::error::Result;
use crate::scope::ScopeChain;

/// Which dispatcher plan code currently sees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchMode {
    /// The real dispatcher.
    #[default]
    Live,
    /// A suppressing wrapper over the real dispatcher.
    Suppressed,
}

/// Options for [`PlanRun::step_with`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepOptions {
    /// Returned instead of running the body when the step is suppressed.
    pub default_value: Option<ResultSet>,
}

impl StepOptions {
    /// Options with a default value for suppressed runs.
    pub fn with_default(default_value: ResultSet) -> Self {
        Self {
            default_value: Some(default_value),
        }
    }
}

/// Run-scoped state for one plan execution.
///
/// Owns the real dispatcher, the [`StepGate`] and the current
/// [`DispatchMode`]. Plan code reaches the dispatcher through
/// [`PlanRun::dispatcher`], which hands out either the real dispatcher or
/// a [`SuppressingDispatcher`] over it depending on whether the resume step
/// has been reached.
///
/// The mode only changes inside [`PlanRun::step`] and
/// [`PlanRun::step_with`], so code between two step boundaries always sees
/// the same dispatcher.
///
/// # Example
///
/// ```
/// use stepgate::dispatch::{DispatchOptions, Dispatcher, RecordingDispatcher};
/// use stepgate::runner::PlanRun;
/// use stepgate::scope::{Scope, ScopeChain};
///
/// let scope = ScopeChain::new(Scope::new("plan").with_binding("start_at_step", "deploy"));
/// let mut recorder = RecordingDispatcher::new();
/// let mut run = PlanRun::new(&mut recorder);
///
/// run.step(&scope, "build");
/// run.dispatcher()
///     .run_command(&["localhost".to_string()], "make", &DispatchOptions::default())
///     .unwrap();
///
/// run.step(&scope, "deploy");
/// run.dispatcher()
///     .run_command(&["localhost".to_string()], "make deploy", &DispatchOptions::default())
///     .unwrap();
///
/// drop(run);
/// assert_eq!(recorder.calls().len(), 1);
/// assert_eq!(
///     recorder.narration(),
///     vec![
///         "Plan Step: \"build\"",
///         "# command 'make' - SKIPPED",
///         "Plan Step: \"deploy\"",
///     ]
/// );
/// ```
pub struct PlanRun<D: Dispatcher> {
    dispatcher: D,
    gate: StepGate,
    mode: DispatchMode,
}

impl<D: Dispatcher> PlanRun<D> {
    /// Start a run that resolves `start_at_step` from the first step's scope.
    pub fn new(dispatcher: D) -> Self {
        Self {
            dispatcher,
            gate: StepGate::new(),
            mode: DispatchMode::Live,
        }
    }

    /// Start a run with a preset configuration.
    pub fn with_config(dispatcher: D, config: RunConfig) -> Self {
        Self {
            dispatcher,
            gate: StepGate::with_config(config),
            mode: DispatchMode::Live,
        }
    }

    /// The dispatcher plan code should use right now.
    pub fn dispatcher(&mut self) -> ActiveDispatcher<'_> {
        match self.mode {
            DispatchMode::Live => ActiveDispatcher::Live(&mut self.dispatcher),
            DispatchMode::Suppressed => {
                ActiveDispatcher::Suppressed(SuppressingDispatcher::new(&mut self.dispatcher))
            }
        }
    }

    /// Current dispatch mode.
    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    /// Whether dispatcher operations are currently suppressed.
    pub fn is_suppressed(&self) -> bool {
        self.mode == DispatchMode::Suppressed
    }

    /// The run's gate.
    pub fn gate(&self) -> &StepGate {
        &self.gate
    }

    /// End the run and give back the real dispatcher.
    pub fn into_dispatcher(self) -> D {
        self.dispatcher
    }

    /// Mark a step boundary.
    ///
    /// Evaluates the gate, swaps the visible dispatcher if suppression
    /// starts or ends here, then announces the step. The announcement goes
    /// to the real dispatcher and is never tagged as skipped.
    pub fn step(&mut self, scope: &ScopeChain, name: &str) -> Decision {
        let decision = self.gate.evaluate(scope, name);

        match (decision.started, self.mode) {
            (true, DispatchMode::Suppressed) => {
                debug!("Restoring real dispatcher at step '{}'", name);
                self.mode = DispatchMode::Live;
            }
            (false, DispatchMode::Live) => {
                debug!("Suppressing dispatcher at step '{}'", name);
                self.mode = DispatchMode::Suppressed;
            }
            _ => {}
        }

        self.dispatcher
            .publish_event(Event::message(format!("Plan Step: \"{}\"", name)));
        decision
    }

    /// Mark a step boundary and run `body` if the step is active.
    ///
    /// When the step is suppressed the body does not run and the result is
    /// `options.default_value`, or an empty set when none was given. Errors
    /// from the body are returned unchanged.
    pub fn step_with<F>(
        &mut self,
        scope: &ScopeChain,
        name: &str,
        options: StepOptions,
        body: F,
    ) -> Result<ResultSet>
    where
        F: FnOnce(&mut Self) -> Result<ResultSet>,
    {
        if self.step(scope, name).started {
            body(self)
        } else {
            Ok(options.default_value.unwrap_or_default())
        }
    }
}
