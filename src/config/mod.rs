//! Declarative task file
//!
//! The task file lists the units to bring up, in order. It is parsed once
//! per invocation and never modified afterwards.

pub mod parser;
pub mod types;

pub use parser::ConfigParser;
pub use types::{BasicCommandTask, Command, Config, CustomBuild, ServiceUnit, Task};
