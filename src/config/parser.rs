//! Task file parser

use super::types::{Config, RawConfig, Task};
use crate::error::{Result, StarterError};
use std::collections::HashSet;
use std::path::Path;

/// Task file parser
pub struct ConfigParser;

impl ConfigParser {
    /// Parse task file from path
    pub fn parse_file(path: &Path) -> Result<Config> {
        let content = std::fs::read_to_string(path).map_err(|source| StarterError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;

        Self::parse_str(&content)
    }

    /// Parse task file from string
    pub fn parse_str(content: &str) -> Result<Config> {
        let raw: RawConfig = serde_yaml::from_str(content)?;

        if !raw.project_root.is_absolute() {
            return Err(StarterError::InvalidConfig(format!(
                "project root is not absolute path: {}",
                raw.project_root.display()
            )));
        }

        let mut tasks = Vec::with_capacity(raw.tasks.len());
        for (idx, raw_task) in raw.tasks.into_iter().enumerate() {
            if raw_task.is_empty() {
                tracing::warn!("Task entry {} declares nothing to run, skipping", idx);
                continue;
            }
            let task = Task::try_from(raw_task).map_err(StarterError::InvalidConfig)?;
            tasks.push(task);
        }

        Ok(Config {
            project_root: raw.project_root,
            tasks,
        })
    }

    /// Validate a loaded configuration, returning non-fatal warnings
    pub fn validate(config: &Config) -> Vec<String> {
        let mut warnings = Vec::new();
        let mut compose_files = HashSet::new();

        for (idx, task) in config.tasks.iter().enumerate() {
            if let Some(basic) = task.basic() {
                if basic.command.args.is_empty() {
                    warnings.push(format!("Task {} has a basic command with no arguments", idx));
                }
                duplicate_env_vars(idx, &basic.required_env_vars, &mut warnings);
            }

            let Some(service) = task.service() else {
                continue;
            };

            duplicate_env_vars(idx, &service.required_env_vars, &mut warnings);

            if service.compose_file_name().is_none() {
                warnings.push(format!(
                    "Task {} compose path '{}' has no file name",
                    idx,
                    service.compose_file_path.display()
                ));
                continue;
            }

            let full_path = config.project_root.join(&service.compose_file_path);
            if !full_path.is_file() {
                warnings.push(format!(
                    "Task {} compose file '{}' does not exist",
                    idx,
                    full_path.display()
                ));
            }

            if !compose_files.insert(service.compose_file_path.clone()) {
                warnings.push(format!(
                    "Task {} reuses compose file '{}' declared by an earlier task",
                    idx,
                    service.compose_file_path.display()
                ));
            }

            if let Some(build) = &service.custom_build {
                if build.command.args.is_empty() {
                    warnings.push(format!("Task {} has a custom build with no arguments", idx));
                }
            }
        }

        warnings
    }
}

fn duplicate_env_vars(idx: usize, names: &[String], warnings: &mut Vec<String>) {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            warnings.push(format!(
                "Task {} lists required variable '{}' more than once",
                idx, name
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_parse_task_file() {
        let yaml = r#"
project_root: /srv/stack
tasks:
  - basic_command:
      command:
        dir: scripts
        args: ["./migrate.sh", "${DB_URL}"]
        env:
          MODE: fast
      req_env_vars: [DB_URL]
  - service:
      compose_file_path: infra/db/docker-compose.yml
      req_env_vars: [POSTGRES_PASSWORD]
      start_cooldown: 5
  - basic_command:
      command:
        args: ["make", "seed"]
    service:
      compose_file_path: product-service/docker-compose.yml
      custom_build:
        command:
          dir: product-service
          args: ["make", "image"]
"#;

        let config = ConfigParser::parse_str(yaml).unwrap();
        assert_eq!(config.project_root, Path::new("/srv/stack"));
        assert_eq!(config.tasks.len(), 3);

        match &config.tasks[0] {
            Task::Basic(basic) => {
                assert_eq!(basic.command.directory, Path::new("scripts"));
                assert_eq!(basic.command.args, vec!["./migrate.sh", "${DB_URL}"]);
                assert_eq!(basic.command.env.get("MODE").map(String::as_str), Some("fast"));
                assert_eq!(basic.required_env_vars, vec!["DB_URL"]);
            }
            other => panic!("expected basic task, got {:?}", other),
        }

        match &config.tasks[1] {
            Task::Service(service) => {
                assert_eq!(service.compose_file_name(), Some("docker-compose.yml"));
                assert_eq!(service.compose_dir(), Path::new("infra/db"));
                assert_eq!(service.start_cooldown, Some(Duration::from_secs(5)));
                assert!(service.custom_build.is_none());
            }
            other => panic!("expected service task, got {:?}", other),
        }

        match &config.tasks[2] {
            Task::Both { basic, service } => {
                assert_eq!(basic.command.args, vec!["make", "seed"]);
                let build = service.custom_build.as_ref().unwrap();
                assert_eq!(build.command.directory, Path::new("product-service"));
            }
            other => panic!("expected combined task, got {:?}", other),
        }
    }

    #[test]
    fn test_relative_project_root_rejected() {
        let yaml = "project_root: relative/path\ntasks: []\n";
        let result = ConfigParser::parse_str(yaml);
        assert!(matches!(result, Err(StarterError::InvalidConfig(_))));
    }

    #[test]
    fn test_missing_project_root_rejected() {
        let result = ConfigParser::parse_str("tasks: []\n");
        assert!(matches!(result, Err(StarterError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_yaml() {
        let result = ConfigParser::parse_str("project_root: [unclosed");
        assert!(matches!(result, Err(StarterError::ConfigParse(_))));
    }

    #[test]
    fn test_empty_task_entries_skipped() {
        let yaml = r#"
project_root: /srv/stack
tasks:
  - {}
  - service:
      compose_file_path: db/docker-compose.yml
"#;
        let config = ConfigParser::parse_str(yaml).unwrap();
        assert_eq!(config.tasks.len(), 1);
        assert!(config.tasks[0].service().is_some());
    }

    #[test]
    fn test_parse_file_missing() {
        let temp = tempdir().unwrap();
        let result = ConfigParser::parse_file(&temp.path().join("start.yaml"));
        assert!(matches!(result, Err(StarterError::ConfigRead { .. })));
    }

    #[test]
    fn test_parse_file() {
        let temp = tempdir().unwrap();
        let path = temp.path().join("start.yaml");
        std::fs::write(
            &path,
            format!(
                "project_root: {}\ntasks:\n  - service:\n      compose_file_path: docker-compose.yml\n",
                temp.path().display()
            ),
        )
        .unwrap();

        let config = ConfigParser::parse_file(&path).unwrap();
        assert_eq!(config.project_root, temp.path());
        assert_eq!(config.tasks.len(), 1);
    }

    #[test]
    fn test_validate_warnings() {
        let temp = tempdir().unwrap();
        std::fs::create_dir_all(temp.path().join("db")).unwrap();
        std::fs::write(temp.path().join("db/docker-compose.yml"), "services: {}\n").unwrap();

        let yaml = format!(
            r#"
project_root: {}
tasks:
  - service:
      compose_file_path: db/docker-compose.yml
  - service:
      compose_file_path: db/docker-compose.yml
  - service:
      compose_file_path: api/docker-compose.yml
  - basic_command:
      command:
        args: []
"#,
            temp.path().display()
        );

        let config = ConfigParser::parse_str(&yaml).unwrap();
        let warnings = ConfigParser::validate(&config);

        assert_eq!(warnings.len(), 3);
        assert!(warnings[0].contains("reuses compose file"));
        assert!(warnings[1].contains("does not exist"));
        assert!(warnings[2].contains("no arguments"));
    }

    #[test]
    fn test_validate_duplicate_required_env_vars() {
        let yaml = r#"
project_root: /srv/stack
tasks:
  - basic_command:
      command:
        args: ["./seed.sh"]
      req_env_vars: [DB_URL, DB_URL]
  - service:
      compose_file_path: db/docker-compose.yml
      req_env_vars: [POSTGRES_PASSWORD, POSTGRES_USER, POSTGRES_PASSWORD]
"#;

        let config = ConfigParser::parse_str(yaml).unwrap();
        let duplicates: Vec<_> = ConfigParser::validate(&config)
            .into_iter()
            .filter(|w| w.contains("more than once"))
            .collect();

        assert_eq!(duplicates.len(), 2);
        assert!(duplicates[0].starts_with("Task 0") && duplicates[0].contains("DB_URL"));
        assert!(duplicates[1].starts_with("Task 1") && duplicates[1].contains("POSTGRES_PASSWORD"));
    }
}
