// src/engine/mod.rs

//! Orchestration engine for sumdag.
//!
//! This module ties together:
//! - the dependency scheduler
//! - the generation executor
//! - the main runtime event loop that reacts to generation completions and
//!   shutdown requests
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`], and [`summarizer`] wires both to a
//! [`SummaryGenerator`](crate::generate::SummaryGenerator).

use std::time::Duration;

use crate::errors::GenerationError;
use crate::model::ProgramId;
use crate::types::FailureMode;

/// Result of a single generation call, as reported back to the runtime.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationOutcome {
    Summary(String),
    Failed(GenerationError),
}

/// Events flowing into the runtime from generation tasks and signal handlers.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// A dispatched generation task finished.
    GenerationCompleted {
        program: ProgramId,
        outcome: GenerationOutcome,
    },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

/// Options used by the pure core.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    pub failure_mode: FailureMode,
}

/// Everything tunable about a summarization run.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Cap on concurrently running generations; `None` means unbounded.
    pub max_in_flight: Option<usize>,
    pub failure_mode: FailureMode,
    /// Per-call limit; a call exceeding it fails with
    /// [`GenerationError::Timeout`].
    pub generation_timeout: Option<Duration>,
}

pub mod core;
pub mod event_handlers;
pub mod runtime;
pub mod summarizer;

pub use self::core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use runtime::Runtime;
pub use summarizer::{Summarizer, summarize};
