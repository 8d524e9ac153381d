//! Plan execution with a resumable starting point.
//!
//! - [`StepGate`] - decides whether each step runs for real
//! - [`PlanRun`] - run-scoped state; swaps in a suppressing dispatcher
//!   until the resume step is reached
//! - [`execute_plan`] - walks a plan file's steps on a [`PlanRun`]

pub mod executor;
pub mod gate;
pub mod run;

pub use executor::{dispatch_action, execute_plan, plan_scope, PlanReport, StepReport};
pub use gate::{Decision, RunConfig, StepGate, START_AT_STEP};
pub use run::{DispatchMode, PlanRun, StepOptions};
