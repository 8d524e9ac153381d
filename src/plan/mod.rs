//! Plan files.
//!
//! A plan is a YAML document listing named steps in execution order. Each
//! step carries a list of actions (commands, scripts, tasks, file
//! transfers, narration) and may nest further steps.
//!
//! ```yaml
//! name: deploy
//! parameters:
//!   start_at_step: ~
//! targets:
//!   web:
//!     dir: build/web
//! tasks:
//!   migrate:
//!     command: ./bin/migrate --env "$PT_env"
//! steps:
//!   - name: build
//!     actions:
//!       - action: run_command
//!         command: make build
//!   - name: migrate
//!     actions:
//!       - action: run_task
//!         task: migrate
//!         targets: [web]
//!         params:
//!           env: production
//! ```
//!
//! # Example
//!
//! ```
//! use stepgate::plan::parse_plan;
//! use std::path::Path;
//!
//! let plan = parse_plan(
//!     "steps:\n  - name: build\n  - name: test\n",
//!     Path::new("plan.yml"),
//! )
//! .unwrap();
//! assert_eq!(plan.step_names(), vec!["build", "test"]);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_plan, parse_plan, DEFAULT_PLAN_FILE};
pub use schema::{ActionConfig, PlanConfig, StepConfig, TargetConfig, TaskConfig, LOCALHOST};
