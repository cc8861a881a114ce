//! Error types for Starter

use std::path::PathBuf;
use thiserror::Error;

/// Result type for Starter operations
pub type Result<T> = std::result::Result<T, StarterError>;

/// Starter error types
#[derive(Error, Debug)]
pub enum StarterError {
    #[error("Command has no arguments")]
    ArgsEmpty,

    #[error("Env var {0} is not defined but required")]
    MissingEnvVar(String),

    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {}", exit_code_display(.code))]
    NonZeroExit {
        program: String,
        code: Option<i32>,
        output: String,
    },

    #[error("Command was cancelled")]
    Cancelled,

    #[error("Failed to read config {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl StarterError {
    /// Captured combined output attached to the error, if any
    pub fn output(&self) -> Option<&str> {
        match self {
            StarterError::NonZeroExit { output, .. } => Some(output),
            _ => None,
        }
    }
}

fn exit_code_display(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}
