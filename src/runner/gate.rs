//! Resume-point tracking.
//!
//! A [`StepGate`] decides, for each step a plan enters, whether that step
//! runs for real. The decision compares step names against the resume
//! step configured through the `start_at_step` variable and latches once
//! the resume step has been seen.
//!
//! A resume step that never appears keeps every step suppressed for the
//! whole run. That is a property of the configuration, not an error.

use tracing::{debug, info, warn};

use crate::scope::ScopeChain;

/// Variable that names the resume step.
pub const START_AT_STEP: &str = "start_at_step";

/// Configuration resolved once per run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunConfig {
    resume_step: Option<String>,
}

impl RunConfig {
    /// A configuration that resumes at `step`, or runs everything when `None`.
    pub fn new(resume_step: Option<String>) -> Self {
        Self { resume_step }
    }

    /// Resolve `start_at_step` from the innermost binding outward.
    pub fn resolve(scope: &ScopeChain) -> Self {
        if scope.lookup(START_AT_STEP).is_some() && scope.lookup_str(START_AT_STEP).is_none() {
            warn!("Ignoring non-scalar {} value", START_AT_STEP);
        }
        Self {
            resume_step: scope.lookup_str(START_AT_STEP),
        }
    }

    /// The step at which real execution resumes.
    pub fn resume_step(&self) -> Option<&str> {
        self.resume_step.as_deref()
    }
}

/// Outcome of [`StepGate::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decision {
    /// Whether the step runs for real.
    pub started: bool,

    /// Whether this step is the one that ended suppression.
    pub resumed_here: bool,
}

impl Decision {
    fn started() -> Self {
        Self {
            started: true,
            resumed_here: false,
        }
    }

    fn suppressed() -> Self {
        Self {
            started: false,
            resumed_here: false,
        }
    }

    fn resumed() -> Self {
        Self {
            started: true,
            resumed_here: true,
        }
    }
}

/// Run-scoped resume state: the cached [`RunConfig`] and the started latch.
#[derive(Debug, Default)]
pub struct StepGate {
    config: Option<RunConfig>,
    started: bool,
}

impl StepGate {
    /// A gate that resolves its configuration from the first scope it sees.
    pub fn new() -> Self {
        Self::default()
    }

    /// A gate with a preset configuration.
    pub fn with_config(config: RunConfig) -> Self {
        Self {
            config: Some(config),
            started: false,
        }
    }

    /// The cached configuration, if a step has been evaluated yet.
    pub fn config(&self) -> Option<&RunConfig> {
        self.config.as_ref()
    }

    /// Whether the resume step has been reached (or no resume step is set).
    pub fn has_started(&self) -> bool {
        self.started
            || self
                .config
                .as_ref()
                .is_some_and(|c| c.resume_step().is_none())
    }

    /// Decide whether `step_name` runs for real.
    ///
    /// The first call resolves and caches the configuration from `scope`;
    /// later calls ignore `scope`. Names are compared exactly.
    pub fn evaluate(&mut self, scope: &ScopeChain, step_name: &str) -> Decision {
        let config = self
            .config
            .get_or_insert_with(|| RunConfig::resolve(scope));

        let decision = match config.resume_step() {
            None => Decision::started(),
            Some(_) if self.started => Decision::started(),
            Some(resume) if resume == step_name => {
                self.started = true;
                info!("Resuming at step '{}'", step_name);
                Decision::resumed()
            }
            Some(_) => Decision::suppressed(),
        };

        debug!("Step '{}' started={}", step_name, decision.started);
        decision
    }
}
