//! Starter - bring a local multi-service stack up and down
//!
//! This is the main CLI entry point for Starter.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use starter::config::{ConfigParser, Task};
use starter::env::EnvSnapshot;
use starter::exec::Executor;
use starter::orchestrator::{StartFailure, StopReport, TaskOrchestrator};
use starter::output;
use starter::service::{ServiceController, DEFAULT_COMPOSE_BIN};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Starter - start and stop a local multi-service stack
#[derive(Parser)]
#[command(name = "starter")]
#[command(version)]
#[command(about = "Start and stop a local multi-service stack from one task file", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Env file added to the ambient environment (repeatable)
    #[arg(long = "env-file", value_name = "PATH", default_values = [".env", "env.env"])]
    env_files: Vec<PathBuf>,

    /// Compose executable
    #[arg(long, value_name = "BIN", default_value = DEFAULT_COMPOSE_BIN)]
    compose_bin: String,

    /// Task file
    config: PathBuf,

    /// Action to perform
    #[arg(value_enum)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Action {
    /// Start every task in order, rolling back on failure
    Start,
    /// Stop every service
    Stop,
    /// Stop every service, then start again
    Restart,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let ambient = EnvSnapshot::from_process().with_env_files(&cli.env_files);

    let config = ConfigParser::parse_file(&cli.config)
        .with_context(|| format!("failed to load task file {}", cli.config.display()))?;
    for warning in ConfigParser::validate(&config) {
        tracing::warn!("{}", warning);
    }

    let executor = Executor::new(&config.project_root, ambient);
    let services = ServiceController::new(executor).compose_bin(&cli.compose_bin);
    let orchestrator = TaskOrchestrator::new(services);
    let tasks = &config.tasks;

    let failed = match cli.action {
        Action::Start => {
            let result = orchestrator.start_many_tasks_with_rollback(tasks).await;
            report_start(tasks, result)?
        }
        Action::Stop => {
            let report = orchestrator.stop_many_services_in_tasks(tasks).await;
            report_stop(tasks, &report)?
        }
        Action::Restart => {
            let report = orchestrator.restart(tasks).await;
            report_stop(tasks, &report.stop)?;
            report_start(tasks, report.start)?
        }
    };

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Print a failed start; returns whether it failed
fn report_start(tasks: &[Task], result: Result<(), StartFailure>) -> anyhow::Result<bool> {
    match result {
        Ok(()) => Ok(false),
        Err(failure) => {
            let mut stdout = std::io::stdout().lock();
            output::write_start_failure(&mut stdout, tasks, &failure)?;
            tracing::error!("{}", failure);
            Ok(true)
        }
    }
}

/// Print failed stops; returns whether any failed
fn report_stop(tasks: &[Task], report: &StopReport) -> anyhow::Result<bool> {
    if report.is_success() {
        tracing::info!("Stopped {} services", report.attempted.len());
        return Ok(false);
    }

    let mut stdout = std::io::stdout().lock();
    output::write_stop_report(&mut stdout, tasks, report)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_positional_arguments() {
        let cli = Cli::try_parse_from(["starter", "start.yaml", "restart"]).unwrap();
        assert_eq!(cli.config, PathBuf::from("start.yaml"));
        assert!(matches!(cli.action, Action::Restart));
        assert_eq!(
            cli.env_files,
            vec![PathBuf::from(".env"), PathBuf::from("env.env")]
        );
        assert_eq!(cli.compose_bin, "docker-compose");
    }

    #[test]
    fn test_missing_action_rejected() {
        assert!(Cli::try_parse_from(["starter", "start.yaml"]).is_err());
        assert!(Cli::try_parse_from(["starter"]).is_err());
        assert!(Cli::try_parse_from(["starter", "start.yaml", "launch"]).is_err());
    }

    #[test]
    fn test_env_file_override() {
        let cli =
            Cli::try_parse_from(["starter", "--env-file", "ci.env", "start.yaml", "stop"]).unwrap();
        assert_eq!(cli.env_files, vec![PathBuf::from("ci.env")]);
        assert!(matches!(cli.action, Action::Stop));
    }
}
