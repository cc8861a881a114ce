//! Compose service lifecycle

use crate::config::{Command, ServiceUnit};
use crate::error::{Result, StarterError};
use crate::exec::{CommandOutput, CommandRunner};
use std::collections::HashMap;

/// Default compose executable
pub const DEFAULT_COMPOSE_BIN: &str = "docker-compose";

/// Starts and stops compose-managed service units
pub struct ServiceController<R> {
    /// Command runner
    runner: R,
    /// Compose executable
    compose_bin: String,
}

impl<R: CommandRunner> ServiceController<R> {
    /// Create a new controller using `docker-compose`
    pub fn new(runner: R) -> Self {
        Self {
            runner,
            compose_bin: DEFAULT_COMPOSE_BIN.to_string(),
        }
    }

    /// Use a different compose executable
    pub fn compose_bin(mut self, bin: &str) -> Self {
        self.compose_bin = bin.to_string();
        self
    }

    /// Underlying command runner
    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Bring a unit up
    ///
    /// Runs the custom build (if any), waits out the cooldown (if any),
    /// checks the required variables against the ambient environment and
    /// finally issues `up -d`. Any failing step aborts before `up`.
    pub async fn start(&self, service: &ServiceUnit) -> Result<CommandOutput> {
        let label = service.label();

        if let Some(build) = &service.custom_build {
            tracing::info!("Building {}", label);
            let built = self.runner.run(&build.command).await?;
            tracing::debug!("Build output for {}:\n{}", label, built.output);
        }

        if let Some(cooldown) = service.start_cooldown {
            tracing::info!("Waiting {:?} before starting {}", cooldown, label);
            tokio::time::sleep(cooldown).await;
        }

        let env = self.runner.ambient().require(&service.required_env_vars)?;

        tracing::info!("Starting {}", label);
        let up = self.compose_command(service, &["up", "-d"], env)?;
        self.runner.run(&up).await
    }

    /// Take a unit down, removing its volumes with no grace period
    ///
    /// Issued whether or not the unit was ever started.
    pub async fn stop(&self, service: &ServiceUnit) -> Result<CommandOutput> {
        tracing::info!("Stopping {}", service.label());
        let down = self.compose_command(service, &["down", "-v", "-t", "0"], HashMap::new())?;
        self.runner.run(&down).await
    }

    fn compose_command(
        &self,
        service: &ServiceUnit,
        verb: &[&str],
        env: HashMap<String, String>,
    ) -> Result<Command> {
        let file = service.compose_file_name().ok_or_else(|| {
            StarterError::InvalidConfig(format!(
                "compose path '{}' has no file name",
                service.compose_file_path.display()
            ))
        })?;

        let mut args = vec![self.compose_bin.clone(), "-f".to_string(), file.to_string()];
        args.extend(verb.iter().map(|s| s.to_string()));

        Ok(Command::new(service.compose_dir(), args).envs(env))
    }
}
