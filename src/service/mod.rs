//! Compose service lifecycle
//!
//! Start: optional build, optional cooldown, required-variable check, then
//! `up -d`. Stop: `down -v -t 0`.

pub mod controller;

pub use controller::{ServiceController, DEFAULT_COMPOSE_BIN};
