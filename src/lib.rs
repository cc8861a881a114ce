//! Starter - bring a local multi-service stack up and down from one file
//!
//! Starter reads an ordered list of tasks and runs them on the local host.
//! Each task is a plain command, a compose-managed service, or both:
//!
//! - Tasks start strictly in declared order
//! - A failed start stops the services started before it, newest first
//! - Stopping attempts every service and reports failures per task
//! - `${NAME}` placeholders in arguments resolve against the environment

pub mod config;
pub mod env;
pub mod error;
pub mod exec;
pub mod orchestrator;
pub mod output;
pub mod service;

pub use error::{Result, StarterError};
