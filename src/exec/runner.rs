//! Command runner abstraction

use super::executor::CommandOutput;
use crate::config::Command;
use crate::env::EnvSnapshot;
use crate::error::Result;
use async_trait::async_trait;

/// Runs a command to completion
///
/// [`super::Executor`] spawns real processes; the service controller and the
/// orchestrator only see this trait.
#[async_trait]
pub trait CommandRunner: Send + Sync {
    /// Ambient environment used for required-variable checks
    fn ambient(&self) -> &EnvSnapshot;

    /// Run `command` and wait for it to exit
    async fn run(&self, command: &Command) -> Result<CommandOutput>;
}
