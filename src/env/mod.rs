//! Environment resolution
//!
//! Builds the environment a command runs with (ambient snapshot plus
//! task-level overrides) and expands `${NAME}` placeholders in its
//! arguments.

pub mod expand;
pub mod snapshot;

pub use expand::{expand_arg, expand_args};
pub use snapshot::EnvSnapshot;
