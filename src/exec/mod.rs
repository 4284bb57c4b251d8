// src/exec/mod.rs

//! Generation execution layer.
//!
//! Runs the generator calls for scheduled programs on Tokio tasks and
//! reports back to the runtime via `RuntimeEvent`s.
//!
//! - [`backend`] provides the `ExecutorBackend` trait and the
//!   `GeneratorBackend` used in production, which tests can replace.
//! - [`task_runner`] runs a single generation call.

pub mod backend;
pub mod task_runner;

pub use backend::{ExecutorBackend, GeneratorBackend};
pub use task_runner::{generate, run_generation};
