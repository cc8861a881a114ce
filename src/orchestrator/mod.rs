//! Task orchestration
//!
//! Tasks run strictly one after another in declared order. A failed start
//! stops the already started service units in reverse order; a stop sweep
//! tries every unit and reports failures per task index.

pub mod report;
pub mod tasks;

pub use report::{RestartReport, StartFailure, StopReport};
pub use tasks::TaskOrchestrator;
