//! Per-target outcomes of dispatcher operations.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one operation on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetStatus {
    Success,
    Failure,
}

/// Result of running an operation against a single target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetResult {
    /// Target name.
    pub target: String,

    /// Kind of operation (`command`, `script`, `task`, `upload`, `download`).
    pub action: String,

    /// What the operation acted on (the command, script path, task name, ...).
    pub object: String,

    /// Success or failure.
    pub status: TargetStatus,

    /// Operation-specific payload (captured output, copied path, task output).
    pub value: Value,
}

impl TargetResult {
    /// Create a successful result.
    pub fn success(target: &str, action: &str, object: &str, value: Value) -> Self {
        Self {
            target: target.to_string(),
            action: action.to_string(),
            object: object.to_string(),
            status: TargetStatus::Success,
            value,
        }
    }

    /// Create a failed result.
    pub fn failure(target: &str, action: &str, object: &str, value: Value) -> Self {
        Self {
            target: target.to_string(),
            action: action.to_string(),
            object: object.to_string(),
            status: TargetStatus::Failure,
            value,
        }
    }

    /// Whether the operation succeeded on this target.
    pub fn is_ok(&self) -> bool {
        self.status == TargetStatus::Success
    }

    /// Error text recorded in the value, if any.
    pub fn error_message(&self) -> Option<&str> {
        self.value
            .get("error")
            .and_then(Value::as_str)
            .or_else(|| self.value.get("stderr").and_then(Value::as_str))
    }
}

/// Ordered collection of [`TargetResult`]s.
///
/// An empty set is what a suppressed operation returns; it is
/// indistinguishable from a real run that touched no targets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultSet {
    results: Vec<TargetResult>,
}

impl ResultSet {
    /// A set with no results.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Wrap a list of results.
    pub fn new(results: Vec<TargetResult>) -> Self {
        Self { results }
    }

    /// Append a result.
    pub fn push(&mut self, result: TargetResult) {
        self.results.push(result);
    }

    /// Number of results.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the set holds no results.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True when every result succeeded (vacuously true when empty).
    pub fn ok(&self) -> bool {
        self.results.iter().all(TargetResult::is_ok)
    }

    /// Number of failed results.
    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.is_ok()).count()
    }

    /// Number of successful results.
    pub fn success_count(&self) -> usize {
        self.len() - self.failure_count()
    }

    /// Target names in result order.
    pub fn targets(&self) -> Vec<&str> {
        self.results.iter().map(|r| r.target.as_str()).collect()
    }

    /// Result for a given target.
    pub fn find(&self, target: &str) -> Option<&TargetResult> {
        self.results.iter().find(|r| r.target == target)
    }

    /// Iterate over results.
    pub fn iter(&self) -> std::slice::Iter<'_, TargetResult> {
        self.results.iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a TargetResult;
    type IntoIter = std::slice::Iter<'a, TargetResult>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter()
    }
}

impl FromIterator<TargetResult> for ResultSet {
    fn from_iter<I: IntoIterator<Item = TargetResult>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
