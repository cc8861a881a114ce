//! Task file configuration types

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// A single external command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Working directory, relative to the project root
    #[serde(default, rename = "dir")]
    pub directory: PathBuf,
    /// Arguments (first is the executable)
    #[serde(default)]
    pub args: Vec<String>,
    /// Task-level environment overrides
    #[serde(default)]
    pub env: HashMap<String, String>,
}

impl Command {
    /// Create a command running `args` in `directory`
    pub fn new<I, S>(directory: impl Into<PathBuf>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            directory: directory.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: HashMap::new(),
        }
    }

    /// Add an environment override
    pub fn env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    /// Set all environment overrides
    pub fn envs(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    /// Executable name, if any
    pub fn program(&self) -> Option<&str> {
        self.args.first().map(String::as_str)
    }
}

/// Custom image build step run before `up`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomBuild {
    /// Build command
    pub command: Command,
}

/// A service managed through a compose file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceUnit {
    /// Compose file path, relative to the project root
    pub compose_file_path: PathBuf,
    /// Variables that must exist in the ambient environment
    #[serde(default, rename = "req_env_vars")]
    pub required_env_vars: Vec<String>,
    /// Optional build step
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_build: Option<CustomBuild>,
    /// Delay between build and `up`
    #[serde(
        default,
        with = "seconds",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_cooldown: Option<Duration>,
}

impl ServiceUnit {
    /// Create a service unit for a compose file
    pub fn new(compose_file_path: impl Into<PathBuf>) -> Self {
        Self {
            compose_file_path: compose_file_path.into(),
            ..Default::default()
        }
    }

    /// Require an ambient environment variable
    pub fn require_env(mut self, name: &str) -> Self {
        self.required_env_vars.push(name.to_string());
        self
    }

    /// Set the build step
    pub fn custom_build(mut self, command: Command) -> Self {
        self.custom_build = Some(CustomBuild { command });
        self
    }

    /// Set the start cooldown
    pub fn start_cooldown(mut self, cooldown: Duration) -> Self {
        self.start_cooldown = Some(cooldown);
        self
    }

    /// Directory containing the compose file
    pub fn compose_dir(&self) -> &Path {
        self.compose_file_path.parent().unwrap_or(Path::new(""))
    }

    /// Compose file name passed to `-f`
    pub fn compose_file_name(&self) -> Option<&str> {
        self.compose_file_path.file_name().and_then(|s| s.to_str())
    }

    /// Human label used in reports
    pub fn label(&self) -> String {
        self.compose_file_path.display().to_string()
    }
}

/// A plain command task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicCommandTask {
    /// Command to run
    pub command: Command,
    /// Variables that must exist in the ambient environment
    #[serde(default, rename = "req_env_vars")]
    pub required_env_vars: Vec<String>,
}

impl BasicCommandTask {
    /// Create a basic command task
    pub fn new(command: Command) -> Self {
        Self {
            command,
            required_env_vars: Vec::new(),
        }
    }

    /// Require an ambient environment variable
    pub fn require_env(mut self, name: &str) -> Self {
        self.required_env_vars.push(name.to_string());
        self
    }
}

/// One entry of the ordered task list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTask", into = "RawTask")]
pub enum Task {
    /// Only a basic command
    Basic(BasicCommandTask),
    /// Only a compose service
    Service(ServiceUnit),
    /// A basic command followed by a compose service
    Both {
        basic: BasicCommandTask,
        service: ServiceUnit,
    },
}

impl Task {
    /// Basic command part, if any
    pub fn basic(&self) -> Option<&BasicCommandTask> {
        match self {
            Task::Basic(basic) | Task::Both { basic, .. } => Some(basic),
            Task::Service(_) => None,
        }
    }

    /// Service part, if any
    pub fn service(&self) -> Option<&ServiceUnit> {
        match self {
            Task::Service(service) | Task::Both { service, .. } => Some(service),
            Task::Basic(_) => None,
        }
    }

    /// Human label used in reports
    pub fn label(&self, index: usize) -> String {
        match self.service() {
            Some(service) => service.label(),
            None => format!("task {}", index),
        }
    }
}

/// On-disk shape of a task: two optional keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTask {
    /// Basic command part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub basic_command: Option<BasicCommandTask>,
    /// Service part
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceUnit>,
}

impl RawTask {
    /// Whether neither part is declared
    pub fn is_empty(&self) -> bool {
        self.basic_command.is_none() && self.service.is_none()
    }
}

impl TryFrom<RawTask> for Task {
    type Error = String;

    fn try_from(raw: RawTask) -> std::result::Result<Self, Self::Error> {
        match (raw.basic_command, raw.service) {
            (Some(basic), Some(service)) => Ok(Task::Both { basic, service }),
            (Some(basic), None) => Ok(Task::Basic(basic)),
            (None, Some(service)) => Ok(Task::Service(service)),
            (None, None) => Err("task declares neither basic_command nor service".to_string()),
        }
    }
}

impl From<Task> for RawTask {
    fn from(task: Task) -> Self {
        match task {
            Task::Basic(basic) => RawTask {
                basic_command: Some(basic),
                service: None,
            },
            Task::Service(service) => RawTask {
                basic_command: None,
                service: Some(service),
            },
            Task::Both { basic, service } => RawTask {
                basic_command: Some(basic),
                service: Some(service),
            },
        }
    }
}

/// Task file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Config {
    /// Absolute project root
    pub project_root: PathBuf,
    /// Tasks in declared order
    pub tasks: Vec<Task>,
}

/// On-disk shape of the task file, before empty entries are dropped
#[derive(Debug, Deserialize)]
pub(crate) struct RawConfig {
    #[serde(default)]
    pub project_root: PathBuf,
    #[serde(default)]
    pub tasks: Vec<RawTask>,
}

/// `start_cooldown` is written as whole seconds
mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(d) => serializer.serialize_u64(d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}
