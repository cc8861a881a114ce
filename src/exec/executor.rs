//! Process execution rooted at the project directory

use super::handle::CommandHandle;
use super::prepared::PreparedCommand;
use super::runner::CommandRunner;
use crate::config::Command;
use crate::env::EnvSnapshot;
use crate::error::{Result, StarterError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Child;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Captured result of a successful command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Interleaved stdout and stderr
    pub output: String,
}

/// Runs commands relative to the project root with the ambient environment
#[derive(Debug, Clone)]
pub struct Executor {
    /// Absolute project root
    root: PathBuf,
    /// Ambient environment snapshot
    ambient: EnvSnapshot,
}

impl Executor {
    /// Create a new executor
    pub fn new(root: impl Into<PathBuf>, ambient: EnvSnapshot) -> Self {
        Self {
            root: root.into(),
            ambient,
        }
    }

    /// Project root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a command without running it
    pub fn prepare(&self, command: &Command) -> Result<PreparedCommand> {
        PreparedCommand::prepare(command, &self.root, &self.ambient)
    }

    /// Run a command and wait for it to exit
    ///
    /// Returns the combined stdout/stderr on exit code 0. Any other exit
    /// yields [`StarterError::NonZeroExit`] carrying the same output.
    pub async fn run_sync(&self, command: &Command) -> Result<CommandOutput> {
        let prepared = self.prepare(command)?;
        tracing::debug!("Running `{}` in {}", prepared, prepared.cwd.display());

        let mut child = prepared
            .to_command(true)
            .spawn()
            .map_err(|e| prepared.spawn_error(e))?;

        let output = read_combined(&mut child).await?;
        let status = child.wait().await?;
        let output = String::from_utf8_lossy(&output).into_owned();

        if status.success() {
            tracing::debug!("`{}` finished", prepared.program);
            Ok(CommandOutput { output })
        } else {
            tracing::debug!("`{}` failed with {}", prepared.program, status);
            Err(StarterError::NonZeroExit {
                program: prepared.program,
                code: status.code(),
                output,
            })
        }
    }

    /// Start a command in the background
    ///
    /// The returned handle resolves exactly once: with the exit result, a
    /// spawn failure, or [`StarterError::Cancelled`]. Output is discarded.
    /// Must be called from within a tokio runtime.
    pub fn spawn(&self, command: &Command) -> Result<CommandHandle> {
        let prepared = self.prepare(command)?;
        tracing::debug!(
            "Starting `{}` in {} (background)",
            prepared,
            prepared.cwd.display()
        );

        let cancel = CancellationToken::new();
        let (tx, rx) = oneshot::channel();
        let token = cancel.clone();

        tokio::spawn(async move {
            let result = tokio::select! {
                _ = token.cancelled() => Err(StarterError::Cancelled),
                result = wait_for_exit(&prepared) => result,
            };
            if let Err(e) = &result {
                tracing::debug!("Background `{}` ended: {}", prepared.program, e);
            }
            let _ = tx.send(result);
        });

        Ok(CommandHandle::new(rx, cancel))
    }
}

#[async_trait]
impl CommandRunner for Executor {
    fn ambient(&self) -> &EnvSnapshot {
        &self.ambient
    }

    async fn run(&self, command: &Command) -> Result<CommandOutput> {
        self.run_sync(command).await
    }
}

async fn wait_for_exit(prepared: &PreparedCommand) -> Result<()> {
    // Dropping this future kills the child (kill_on_drop)
    let status = prepared
        .to_command(false)
        .status()
        .await
        .map_err(|e| prepared.spawn_error(e))?;

    if status.success() {
        Ok(())
    } else {
        Err(StarterError::NonZeroExit {
            program: prepared.program.clone(),
            code: status.code(),
            output: String::new(),
        })
    }
}

/// Read stdout and stderr line by line in arrival order
async fn read_combined(child: &mut Child) -> std::io::Result<Vec<u8>> {
    let mut combined = Vec::new();
    let (Some(stdout), Some(stderr)) = (child.stdout.take(), child.stderr.take()) else {
        return Ok(combined);
    };

    let mut stdout = BufReader::new(stdout);
    let mut stderr = BufReader::new(stderr);
    let mut out_line = Vec::new();
    let mut err_line = Vec::new();
    let mut out_open = true;
    let mut err_open = true;

    while out_open || err_open {
        // Partial reads stay in the line buffers until the line completes
        tokio::select! {
            read = stdout.read_until(b'\n', &mut out_line), if out_open => {
                if read? == 0 {
                    out_open = false;
                }
                combined.append(&mut out_line);
            }
            read = stderr.read_until(b'\n', &mut err_line), if err_open => {
                if read? == 0 {
                    err_open = false;
                }
                combined.append(&mut err_line);
            }
        }
    }

    Ok(combined)
}
