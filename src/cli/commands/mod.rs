//! Command implementations.
//!
//! Each subcommand has its own module with a struct implementing
//! [`Command`].

pub mod dispatcher;
pub mod list;
pub mod run;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
pub use list::ListCommand;
pub use run::RunCommand;
