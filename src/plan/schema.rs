//! Plan file schema definitions.
//!
//! These structs map directly onto the YAML plan format.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::dispatch::{Params, TargetParams};

/// Name of the implicit target that maps to the project root.
pub const LOCALHOST: &str = "localhost";

/// Root structure of a plan file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Plan name (for display purposes)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// What the plan does
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Top-level variable bindings, including `start_at_step`
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,

    /// Named targets actions can run against
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub targets: BTreeMap<String, TargetConfig>,

    /// Named tasks
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub tasks: BTreeMap<String, TaskConfig>,

    /// Steps in execution order
    pub steps: Vec<StepConfig>,
}

impl PlanConfig {
    /// Names of the top-level steps, in order.
    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name.as_str()).collect()
    }

    /// Every step name including nested ones, depth-first, paired with its depth.
    pub fn all_steps(&self) -> Vec<(usize, &StepConfig)> {
        fn walk<'a>(steps: &'a [StepConfig], depth: usize, out: &mut Vec<(usize, &'a StepConfig)>) {
            for step in steps {
                out.push((depth, step));
                walk(&step.steps, depth + 1, out);
            }
        }

        let mut out = Vec::new();
        walk(&self.steps, 0, &mut out);
        out
    }
}

/// A place actions run: a working directory plus environment.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TargetConfig {
    /// Working directory, relative to the project root. Defaults to the root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Extra environment variables for everything run on this target
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
}

/// A named, parameterised command.
///
/// Parameters reach the command as `PT_<name>` environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskConfig {
    /// Shell command to run
    pub command: String,

    /// What the task does
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// One named step.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StepConfig {
    /// Step name, matched exactly against `start_at_step`
    pub name: String,

    /// Variables bound while this step and its children run
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, Value>,

    /// Actions run in order
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<ActionConfig>,

    /// Nested steps, run after this step's actions
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub steps: Vec<StepConfig>,
}

/// An operation performed by a step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ActionConfig {
    RunCommand {
        command: String,
        #[serde(default = "default_targets")]
        targets: Vec<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        catch_errors: bool,
    },
    RunScript {
        script: PathBuf,
        #[serde(default)]
        arguments: Vec<String>,
        #[serde(default = "default_targets")]
        targets: Vec<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        catch_errors: bool,
    },
    RunTask {
        task: String,
        #[serde(default)]
        params: Params,
        #[serde(default = "default_targets")]
        targets: Vec<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        catch_errors: bool,
    },
    RunTaskWith {
        task: String,
        /// Target name to task parameters
        params: TargetParams,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        catch_errors: bool,
    },
    UploadFile {
        source: PathBuf,
        destination: String,
        #[serde(default = "default_targets")]
        targets: Vec<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        catch_errors: bool,
    },
    DownloadFile {
        source: String,
        destination: PathBuf,
        #[serde(default = "default_targets")]
        targets: Vec<String>,
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        catch_errors: bool,
    },
    Message {
        message: String,
    },
    Verbose {
        message: String,
    },
}

fn default_targets() -> Vec<String> {
    vec![LOCALHOST.to_string()]
}
