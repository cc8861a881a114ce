//! Recording command runner for tests

use super::executor::CommandOutput;
use super::runner::CommandRunner;
use crate::config::Command;
use crate::env::EnvSnapshot;
use crate::error::{Result, StarterError};
use async_trait::async_trait;
use std::sync::Mutex;

type Matcher = Box<dyn Fn(&Command) -> bool + Send + Sync>;

/// Records every command instead of running it
pub(crate) struct RecordingRunner {
    ambient: EnvSnapshot,
    calls: Mutex<Vec<Command>>,
    failures: Vec<Matcher>,
}

impl RecordingRunner {
    pub fn new(ambient: EnvSnapshot) -> Self {
        Self {
            ambient,
            calls: Mutex::new(Vec::new()),
            failures: Vec::new(),
        }
    }

    /// Fail every command whose arguments contain all of `needles`
    pub fn fail_on(mut self, needles: &[&str]) -> Self {
        let needles: Vec<String> = needles.iter().map(|s| s.to_string()).collect();
        self.failures.push(Box::new(move |cmd: &Command| {
            needles.iter().all(|n| cmd.args.iter().any(|a| a == n))
        }));
        self
    }

    pub fn calls(&self) -> Vec<Command> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every recorded call, joined with spaces
    pub fn call_lines(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| format!("{} {}", c.directory.display(), c.args.join(" ")))
            .collect()
    }

    /// Compose directories that received `down`, in call order
    pub fn downs(&self) -> Vec<String> {
        self.compose_calls("down")
    }

    /// Compose directories that received `up`, in call order
    pub fn ups(&self) -> Vec<String> {
        self.compose_calls("up")
    }

    fn compose_calls(&self, verb: &str) -> Vec<String> {
        self.calls()
            .iter()
            .filter(|c| c.args.first().map(String::as_str) == Some("docker-compose"))
            .filter(|c| c.args.iter().any(|a| a == verb))
            .map(|c| c.directory.display().to_string())
            .collect()
    }
}

#[async_trait]
impl CommandRunner for RecordingRunner {
    fn ambient(&self) -> &EnvSnapshot {
        &self.ambient
    }

    async fn run(&self, command: &Command) -> Result<CommandOutput> {
        if command.args.is_empty() {
            return Err(StarterError::ArgsEmpty);
        }
        self.calls.lock().unwrap().push(command.clone());

        if self.failures.iter().any(|matches| matches(command)) {
            return Err(StarterError::NonZeroExit {
                program: command.args[0].clone(),
                code: Some(1),
                output: format!("failed: {}", command.args.join(" ")),
            });
        }

        Ok(CommandOutput {
            output: format!("ok: {}", command.args.join(" ")),
        })
    }
}
