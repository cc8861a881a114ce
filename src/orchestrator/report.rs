//! Outcomes of start and stop sweeps

use crate::error::{Result, StarterError};
use crate::exec::CommandOutput;
use std::collections::BTreeMap;
use thiserror::Error;

/// Outcome of a best-effort stop sweep
///
/// Failures are collected per task index; one failing unit never prevents
/// attempts on the rest.
#[derive(Debug, Default)]
pub struct StopReport {
    /// Task indices whose stop was attempted, in attempt order
    pub attempted: Vec<usize>,
    /// Failed stops by task index
    pub errors: BTreeMap<usize, StarterError>,
    /// Captured output of failed stops by task index
    pub outputs: BTreeMap<usize, String>,
}

impl StopReport {
    /// Record the result of one stop attempt
    pub fn record(&mut self, index: usize, result: Result<CommandOutput>) {
        self.attempted.push(index);
        if let Err(error) = result {
            let output = error.output().unwrap_or_default().to_string();
            self.outputs.insert(index, output);
            self.errors.insert(index, error);
        }
    }

    /// Whether every attempted stop succeeded
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Indices of failed stops, ascending
    pub fn failed_indices(&self) -> Vec<usize> {
        self.errors.keys().copied().collect()
    }
}

/// A task that failed to start, together with the rollback that followed
#[derive(Debug, Error)]
#[error("task {index} ({label}) failed to start: {error}")]
pub struct StartFailure {
    /// Index of the failing task
    pub index: usize,
    /// Human label of the failing task
    pub label: String,
    /// The original error
    #[source]
    pub error: StarterError,
    /// Stops issued for earlier service units
    pub rollback: StopReport,
}

impl StartFailure {
    /// Captured output of the failing step, if any
    pub fn output(&self) -> Option<&str> {
        self.error.output()
    }
}

/// Outcome of a stop sweep followed by a start
#[derive(Debug)]
pub struct RestartReport {
    /// The stop sweep
    pub stop: StopReport,
    /// The start that followed
    pub start: std::result::Result<(), StartFailure>,
}
