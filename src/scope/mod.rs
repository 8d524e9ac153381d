//! Nested variable scopes.
//!
//! Plans bind variables at several levels: the plan's own parameters,
//! overrides from the command line, and per-step `vars`. A [`ScopeChain`]
//! holds these as an ordered list of [`Scope`] frames and resolves a name
//! by walking from the innermost frame outward.
//!
//! # Example
//!
//! ```
//! use stepgate::scope::{Scope, ScopeChain};
//!
//! let mut chain = ScopeChain::new(Scope::new("plan").with_binding("env", "staging"));
//! chain.push(Scope::new("deploy").with_binding("env", "production"));
//!
//! assert_eq!(chain.lookup_str("env").as_deref(), Some("production"));
//! chain.pop();
//! assert_eq!(chain.lookup_str("env").as_deref(), Some("staging"));
//! ```

pub mod chain;
pub mod frame;

pub use chain::ScopeChain;
pub use frame::Scope;
