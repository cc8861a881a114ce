//! Fully resolved command, ready to spawn

use crate::config::Command;
use crate::env::{expand_args, EnvSnapshot};
use crate::error::{Result, StarterError};
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Stdio;

/// A command with its working directory, environment and arguments resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedCommand {
    /// Executable
    pub program: String,
    /// Arguments after the executable
    pub args: Vec<String>,
    /// Absolute working directory
    pub cwd: PathBuf,
    /// Full environment (ambient plus overrides)
    pub env: HashMap<String, String>,
}

impl PreparedCommand {
    /// Resolve `command` against the project root and the ambient snapshot
    ///
    /// Fails with [`StarterError::ArgsEmpty`] when there is nothing to run.
    pub fn prepare(command: &Command, root: &Path, ambient: &EnvSnapshot) -> Result<Self> {
        if command.args.is_empty() {
            return Err(StarterError::ArgsEmpty);
        }

        let env = ambient.merge(&command.env);
        let mut args = expand_args(&command.args, &env).into_iter();
        let program = args.next().ok_or(StarterError::ArgsEmpty)?;

        Ok(Self {
            program,
            args: args.collect(),
            cwd: root.join(&command.directory),
            env,
        })
    }

    /// Build the tokio command with captured output
    pub(crate) fn to_command(&self, capture: bool) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args)
            .current_dir(&self.cwd)
            .env_clear()
            .envs(&self.env)
            .stdin(Stdio::null())
            .kill_on_drop(true);

        if capture {
            cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
        } else {
            cmd.stdout(Stdio::null()).stderr(Stdio::null());
        }

        cmd
    }

    pub(crate) fn spawn_error(&self, source: std::io::Error) -> StarterError {
        StarterError::Spawn {
            program: self.program.clone(),
            source,
        }
    }
}

impl fmt::Display for PreparedCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}
