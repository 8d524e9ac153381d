//! A single scope frame.

use serde_json::Value;
use std::collections::BTreeMap;

/// One level of variable bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    name: String,
    bindings: BTreeMap<String, Value>,
}

impl Scope {
    /// Create an empty frame.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bindings: BTreeMap::new(),
        }
    }

    /// Create a frame from an existing set of bindings.
    pub fn from_bindings(name: impl Into<String>, bindings: BTreeMap<String, Value>) -> Self {
        Self {
            name: name.into(),
            bindings,
        }
    }

    /// Builder-style variant of [`Scope::bind`].
    pub fn with_binding(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.bind(key, value);
        self
    }

    /// Bind a variable in this frame, replacing any previous local value.
    pub fn bind(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.bindings.insert(key.into(), value.into());
    }

    /// Frame name, used only for diagnostics.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether `key` is bound in this frame (not in an ancestor).
    ///
    /// A key bound to `null` still counts as bound.
    pub fn is_bound(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Local value of `key`, ignoring ancestors.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.bindings.get(key)
    }

    /// Number of local bindings.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether this frame has no local bindings.
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
