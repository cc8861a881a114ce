//! External command execution
//!
//! Commands run relative to the project root, with the ambient environment
//! merged with task-level overrides. They run either to completion
//! ([`Executor::run_sync`]) or in the background behind a
//! [`CommandHandle`] ([`Executor::spawn`]).

pub mod executor;
pub mod handle;
pub mod prepared;
pub mod runner;

#[cfg(test)]
pub(crate) mod testing;

pub use executor::{CommandOutput, Executor};
pub use handle::CommandHandle;
pub use prepared::PreparedCommand;
pub use runner::CommandRunner;
