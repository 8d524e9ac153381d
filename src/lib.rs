//! Stepgate - Run a plan of named steps, optionally resuming part-way.
//!
//! A plan is an ordered list of named steps. When a resume step is
//! configured (the `start_at_step` binding), every step before it is still
//! narrated but its side effects are swallowed: commands, scripts, tasks and
//! file transfers report `SKIPPED` and return an empty result set.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`dispatch`] - The dispatcher capability set and its implementations
//! - [`error`] - Error types and result aliases
//! - [`plan`] - Plan file schema and loading
//! - [`runner`] - Step gating and plan execution
//! - [`scope`] - Nested variable scopes
//! - [`shell`] - Shell command execution
//! - [`ui`] - Terminal output
//!
//! # Example
//!
//! ```
//! use stepgate::dispatch::{DispatchOptions, Dispatcher, RecordingDispatcher};
//! use stepgate::runner::PlanRun;
//! use stepgate::scope::{Scope, ScopeChain};
//!
//! let scope = ScopeChain::new(Scope::new("top").with_binding("start_at_step", "deploy"));
//! let mut run = PlanRun::new(RecordingDispatcher::new());
//!
//! run.step(&scope, "build");
//! run.dispatcher()
//!     .run_command(&["localhost".to_string()], "make", &DispatchOptions::default())
//!     .unwrap();
//!
//! run.step(&scope, "deploy");
//! run.dispatcher()
//!     .run_command(&["localhost".to_string()], "./deploy", &DispatchOptions::default())
//!     .unwrap();
//!
//! let recorder = run.into_dispatcher();
//! assert_eq!(recorder.calls().len(), 1);
//! assert!(recorder.has_narration("# command 'make' - SKIPPED"));
//! ```

pub mod cli;
pub mod dispatch;
pub mod error;
pub mod plan;
pub mod runner;
pub mod scope;
pub mod shell;
pub mod ui;

pub use error::{Result, StepgateError};
