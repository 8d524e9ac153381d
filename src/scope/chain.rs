//! Ordered stack of scope frames.

use serde_json::Value;

use super::frame::Scope;

/// An ordered list of frames, outermost first.
///
/// The chain is never empty: the outermost frame is supplied at
/// construction and [`ScopeChain::pop`] refuses to remove it.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopeChain {
    frames: Vec<Scope>,
}

impl Default for ScopeChain {
    fn default() -> Self {
        Self::new(Scope::new("top"))
    }
}

impl ScopeChain {
    /// Create a chain with a single outermost frame.
    pub fn new(top: Scope) -> Self {
        Self { frames: vec![top] }
    }

    /// Enter a nested frame.
    pub fn push(&mut self, scope: Scope) {
        self.frames.push(scope);
    }

    /// Leave the innermost frame. The outermost frame is never removed.
    pub fn pop(&mut self) -> Option<Scope> {
        if self.frames.len() > 1 {
            self.frames.pop()
        } else {
            None
        }
    }

    /// A copy of this chain with `scope` pushed on top.
    pub fn child(&self, scope: Scope) -> Self {
        let mut chain = self.clone();
        chain.push(scope);
        chain
    }

    /// Number of frames.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Innermost frame.
    pub fn innermost(&self) -> &Scope {
        // `frames` always holds the top frame
        &self.frames[self.frames.len() - 1]
    }

    /// Innermost frame, mutably.
    pub fn innermost_mut(&mut self) -> &mut Scope {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Frames from innermost to outermost.
    pub fn frames_inward_out(&self) -> impl Iterator<Item = &Scope> {
        self.frames.iter().rev()
    }

    /// Resolve `key` by walking from the innermost frame outward.
    ///
    /// A frame that binds `key` to `null` does not stop the walk: the
    /// search continues in the enclosing frames.
    pub fn lookup(&self, key: &str) -> Option<&Value> {
        self.frames_inward_out()
            .filter(|frame| frame.is_bound(key))
            .filter_map(|frame| frame.get(key))
            .find(|value| !value.is_null())
    }

    /// Resolve `key` as a string.
    ///
    /// Numbers and booleans are rendered with their display form so that
    /// YAML like `start_at_step: 2` still names step `"2"`. Arrays and
    /// objects have no string form and resolve to `None`.
    pub fn lookup_str(&self, key: &str) -> Option<String> {
        match self.lookup(key)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_levels() -> ScopeChain {
        let mut chain = ScopeChain::new(Scope::new("plan").with_binding("a", "plan-a"));
        chain.push(Scope::new("cli").with_binding("b", "cli-b"));
        chain.push(Scope::new("step").with_binding("a", "step-a"));
        chain
    }

    #[test]
    fn innermost_binding_wins() {
        let chain = three_levels();
        assert_eq!(chain.lookup_str("a").as_deref(), Some("step-a"));
    }

    #[test]
    fn lookup_reaches_ancestors() {
        let chain = three_levels();
        assert_eq!(chain.lookup_str("b").as_deref(), Some("cli-b"));
    }

    #[test]
    fn missing_key_is_none() {
        let chain = three_levels();
        assert_eq!(chain.lookup("missing"), None);
    }

    #[test]
    fn null_binding_falls_through_to_parent() {
        let mut chain = ScopeChain::new(Scope::new("plan").with_binding("x", "outer"));
        chain.push(Scope::new("step").with_binding("x", Value::Null));
        assert_eq!(chain.lookup_str("x").as_deref(), Some("outer"));
    }

    #[test]
    fn null_everywhere_is_none() {
        let chain = ScopeChain::new(Scope::new("plan").with_binding("x", Value::Null));
        assert_eq!(chain.lookup("x"), None);
    }

    #[test]
    fn scalars_render_as_strings() {
        let chain = ScopeChain::new(
            Scope::new("plan")
                .with_binding("n", 2)
                .with_binding("flag", true)
                .with_binding("list", serde_json::json!(["a"])),
        );
        assert_eq!(chain.lookup_str("n").as_deref(), Some("2"));
        assert_eq!(chain.lookup_str("flag").as_deref(), Some("true"));
        assert_eq!(chain.lookup_str("list"), None);
    }

    #[test]
    fn pop_never_removes_outermost() {
        let mut chain = three_levels();
        assert!(chain.pop().is_some());
        assert!(chain.pop().is_some());
        assert!(chain.pop().is_none());
        assert_eq!(chain.depth(), 1);
        assert_eq!(chain.innermost().name(), "plan");
    }

    #[test]
    fn child_leaves_parent_untouched() {
        let chain = ScopeChain::new(Scope::new("plan"));
        let child = chain.child(Scope::new("step").with_binding("k", "v"));
        assert_eq!(child.depth(), 2);
        assert_eq!(chain.depth(), 1);
        assert_eq!(chain.lookup("k"), None);
    }
}
