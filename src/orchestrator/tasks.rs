//! Ordered task orchestration with rollback

use super::report::{RestartReport, StartFailure, StopReport};
use crate::config::{BasicCommandTask, Task};
use crate::error::Result;
use crate::exec::CommandRunner;
use crate::service::ServiceController;

/// Walks the task list in declared order
pub struct TaskOrchestrator<R> {
    /// Service lifecycle controller
    services: ServiceController<R>,
}

impl<R: CommandRunner> TaskOrchestrator<R> {
    /// Create a new orchestrator
    pub fn new(services: ServiceController<R>) -> Self {
        Self { services }
    }

    /// Service lifecycle controller
    pub fn services(&self) -> &ServiceController<R> {
        &self.services
    }

    /// Start every task in order, rolling back on the first failure
    ///
    /// When task `i` fails, the service units of tasks `i-1` down to `0` are
    /// stopped. Rollback failures are collected in the returned
    /// [`StartFailure`], which always carries task `i`'s original error.
    /// Basic commands are never undone.
    pub async fn start_many_tasks_with_rollback(
        &self,
        tasks: &[Task],
    ) -> std::result::Result<(), StartFailure> {
        tracing::info!("Starting {} tasks...", tasks.len());

        for (idx, task) in tasks.iter().enumerate() {
            if let Err(error) = self.start_task(task).await {
                let label = task.label(idx);
                tracing::warn!("Task {} ({}) failed to start: {}", idx, label, error);

                let rollback = self.rollback(tasks, idx).await;
                return Err(StartFailure {
                    index: idx,
                    label,
                    error,
                    rollback,
                });
            }
        }

        tracing::info!("All tasks started");
        Ok(())
    }

    /// Stop the service unit of every task, in declared order
    ///
    /// Each stop is attempted regardless of earlier failures.
    pub async fn stop_many_services_in_tasks(&self, tasks: &[Task]) -> StopReport {
        tracing::info!("Stopping services...");

        let mut report = StopReport::default();
        for (idx, task) in tasks.iter().enumerate() {
            let Some(service) = task.service() else {
                continue;
            };
            let result = self.services.stop(service).await;
            if let Err(e) = &result {
                tracing::warn!("Task {} ({}): error while stopping: {}", idx, service.label(), e);
            }
            report.record(idx, result);
        }

        report
    }

    /// Stop sweep followed by a start with rollback
    ///
    /// Stop failures do not prevent the start.
    pub async fn restart(&self, tasks: &[Task]) -> RestartReport {
        let stop = self.stop_many_services_in_tasks(tasks).await;
        let start = self.start_many_tasks_with_rollback(tasks).await;
        RestartReport { stop, start }
    }

    async fn start_task(&self, task: &Task) -> Result<()> {
        match task {
            Task::Basic(basic) => self.run_basic(basic).await,
            Task::Service(service) => self.services.start(service).await.map(drop),
            Task::Both { basic, service } => {
                self.run_basic(basic).await?;
                self.services.start(service).await.map(drop)
            }
        }
    }

    async fn run_basic(&self, basic: &BasicCommandTask) -> Result<()> {
        let runner = self.services.runner();
        runner.ambient().require(&basic.required_env_vars)?;

        tracing::info!("Running {}", basic.command.program().unwrap_or("<empty command>"));
        let out = runner.run(&basic.command).await?;
        tracing::debug!("Command output:\n{}", out.output);
        Ok(())
    }

    async fn rollback(&self, tasks: &[Task], failed: usize) -> StopReport {
        let mut report = StopReport::default();

        for idx in (0..failed).rev() {
            let Some(service) = tasks[idx].service() else {
                continue;
            };
            let result = self.services.stop(service).await;
            if let Err(e) = &result {
                tracing::warn!(
                    "Error while doing rollback (can't stop {}): {}",
                    service.label(),
                    e
                );
            }
            report.record(idx, result);
        }

        report
    }
}


#[cfg(all(test, unix))]
mod process_tests {
    use super::*;
    use crate::config::{Command, ServiceUnit};
    use crate::env::EnvSnapshot;
    use crate::exec::Executor;
    use std::path::Path;
    use tempfile::tempdir;

    // `sh -f docker-compose.yml up -d` runs the compose file as a script,
    // so each unit's compose file records how it was invoked.
    fn write_unit(root: &Path, name: &str, fail_up: bool) {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        let mut script = format!("echo \"{} $*\" >> \"$STARTER_LOG\"\n", name);
        if fail_up {
            script.push_str("if [ \"$1\" = up ]; then echo \"cannot start\"; exit 1; fi\n");
        }
        std::fs::write(dir.join("docker-compose.yml"), script).unwrap();
    }

    fn orchestrator(root: &Path) -> TaskOrchestrator<Executor> {
        let ambient: EnvSnapshot = [
            ("PATH", std::env::var("PATH").unwrap_or_default()),
            ("STARTER_LOG", root.join("calls.log").display().to_string()),
        ]
        .into_iter()
        .collect();
        let executor = Executor::new(root, ambient);
        TaskOrchestrator::new(ServiceController::new(executor).compose_bin("sh"))
    }

    fn log_lines(root: &Path) -> Vec<String> {
        std::fs::read_to_string(root.join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[tokio::test]
    async fn test_real_processes_roll_back_on_failure() {
        let temp = tempdir().unwrap();
        write_unit(temp.path(), "db", false);
        write_unit(temp.path(), "broken", true);
        let orch = orchestrator(temp.path());

        let tasks = vec![
            Task::Both {
                basic: BasicCommandTask::new(Command::new(
                    "db",
                    ["sh", "-c", "echo \"migrate $0\" >> \"$STARTER_LOG\"", "${STARTER_LOG}"],
                )),
                service: ServiceUnit::new("db/docker-compose.yml"),
            },
            Task::Service(ServiceUnit::new("broken/docker-compose.yml")),
        ];

        let failure = orch.start_many_tasks_with_rollback(&tasks).await.unwrap_err();

        assert_eq!(failure.index, 1);
        assert_eq!(failure.output(), Some("cannot start\n"));
        assert!(failure.rollback.is_success());
        assert_eq!(
            log_lines(temp.path()),
            vec![
                format!("migrate {}", temp.path().join("calls.log").display()),
                "db up -d".to_string(),
                "broken up -d".to_string(),
                "db down -v -t 0".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_real_processes_stop_sweep() {
        let temp = tempdir().unwrap();
        write_unit(temp.path(), "db", false);
        write_unit(temp.path(), "api", false);
        let orch = orchestrator(temp.path());

        let tasks = vec![
            Task::Service(ServiceUnit::new("db/docker-compose.yml")),
            Task::Service(ServiceUnit::new("missing/docker-compose.yml")),
            Task::Service(ServiceUnit::new("api/docker-compose.yml")),
        ];

        let report = orch.stop_many_services_in_tasks(&tasks).await;

        // the missing unit's directory does not exist, so its spawn fails
        assert_eq!(report.failed_indices(), vec![1]);
        assert!(matches!(report.errors[&1], crate::error::StarterError::Spawn { .. }));
        assert_eq!(
            log_lines(temp.path()),
            vec!["db down -v -t 0", "api down -v -t 0"]
        );
    }
}
