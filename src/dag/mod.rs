// src/dag/mod.rs

//! Dependency graph and scheduling.
//!
//! - [`graph`] builds the program dependency graph from raw records.
//! - [`scheduler`] contains the per-run state machine that decides which
//!   programs are ready, and releases dependents as summaries land.
//! - [`program_state`] provides per-program run state and the scheduled
//!   work type handed to the executor.
//! - [`scheduler_step`] defines the result types for scheduler steps.
//! - [`state_manager`] applies per-run state transitions.

pub mod graph;
pub mod program_state;
pub mod scheduler;
pub mod scheduler_step;
pub(crate) mod state_manager;

pub use graph::DependencyGraph;
pub use program_state::{ProgramRunState, ScheduledProgram};
pub use scheduler::{Scheduler, wavefronts};
pub use scheduler_step::{RunProgress, SchedulerStep};
