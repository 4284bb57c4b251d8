// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from the channel and handing scheduled programs to the executor.

use crate::dag::{RunProgress, Scheduler};
use crate::engine::event_handlers::{
    CoreStep, handle_generation_failure, handle_generation_success, handle_shutdown, handle_start,
};
use crate::engine::{GenerationOutcome, RuntimeEvent, RuntimeOptions};
use crate::errors::{GenerationError, Result, SumdagError};
use crate::model::{ProgramId, Summaries};

/// Pure core runtime state.
///
/// Owns the scheduler, the runtime options and the first observed failure.
/// It has no channels and no Tokio types.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
    options: RuntimeOptions,
    first_failure: Option<(ProgramId, GenerationError)>,
    interrupted: bool,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, options: RuntimeOptions) -> Self {
        Self {
            scheduler,
            options,
            first_failure: None,
            interrupted: false,
        }
    }

    /// Read-only access to the scheduler (for tests and diagnostics).
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Dispatch the initial wave.
    pub fn start(&mut self) -> Result<CoreStep> {
        handle_start(&mut self.scheduler, &self.options)
    }

    /// Handle a single runtime event, returning the commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> Result<CoreStep> {
        match event {
            RuntimeEvent::GenerationCompleted { program, outcome } => match outcome {
                GenerationOutcome::Summary(summary) => {
                    handle_generation_success(&mut self.scheduler, &self.options, &program, summary)
                }
                GenerationOutcome::Failed(error) => Ok(handle_generation_failure(
                    &mut self.scheduler,
                    &mut self.first_failure,
                    &self.options,
                    &program,
                    error,
                )),
            },
            RuntimeEvent::ShutdownRequested => {
                self.interrupted = true;
                Ok(handle_shutdown(&mut self.scheduler))
            }
        }
    }

    /// Record that the event source went away before the run concluded.
    pub fn mark_interrupted(&mut self) {
        self.interrupted = true;
    }

    /// Consume the core and produce the run result.
    ///
    /// Fails with the first generation failure if there was one, then with
    /// an interruption, then with a deadlock if programs remain stuck.
    pub fn finish(self) -> Result<Summaries> {
        let unresolved = self.scheduler.unresolved();

        if let Some((program, source)) = self.first_failure {
            return Err(SumdagError::Generation {
                program,
                source,
                unresolved,
            });
        }

        match self.scheduler.progress() {
            RunProgress::Complete => self.scheduler.store().snapshot(),
            _ if self.interrupted => Err(SumdagError::Interrupted { unresolved }),
            RunProgress::Deadlocked { stuck } => {
                let cycles = self.scheduler.graph().find_cycles(&stuck);
                Err(SumdagError::CycleOrDeadlock { stuck, cycles })
            }
            _ => Err(SumdagError::Interrupted { unresolved }),
        }
    }
}
