// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use tracing::{debug, error, info, warn};

use crate::dag::{ProgramRunState, RunProgress, ScheduledProgram, Scheduler, SchedulerStep};
use crate::engine::RuntimeOptions;
use crate::errors::{GenerationError, Result};
use crate::model::ProgramId;
use crate::types::FailureMode;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone)]
pub enum CoreCommand {
    /// Hand these programs to the executor.
    DispatchPrograms(Vec<ScheduledProgram>),
    /// Cancel every generation still running.
    AbortInFlight,
}

/// Decision returned by the core after handling a single event.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep waiting for events.
    pub keep_running: bool,
}

/// Seed the run with the leaf programs.
pub fn handle_start(scheduler: &mut Scheduler, options: &RuntimeOptions) -> Result<CoreStep> {
    let step = scheduler.start()?;
    Ok(conclude(step, options))
}

/// Handle a successful generation.
pub fn handle_generation_success(
    scheduler: &mut Scheduler,
    options: &RuntimeOptions,
    program: &str,
    summary: String,
) -> Result<CoreStep> {
    let step = scheduler.handle_success(program, summary)?;
    Ok(conclude(step, options))
}

/// Handle a failed generation.
///
/// Only the first failure is kept for the final error; later ones (from
/// siblings still draining) are logged.
pub fn handle_generation_failure(
    scheduler: &mut Scheduler,
    first_failure: &mut Option<(ProgramId, GenerationError)>,
    options: &RuntimeOptions,
    program: &str,
    error: GenerationError,
) -> CoreStep {
    let was_running = scheduler.run_state_of(program) == Some(ProgramRunState::Running);
    let step = scheduler.handle_failure(program);

    if was_running {
        match first_failure {
            None => {
                error!(program = %program, error = %error, "first generation failure; run will fail");
                *first_failure = Some((program.to_string(), error));
            }
            Some((first, _)) => {
                warn!(
                    program = %program,
                    first = %first,
                    error = %error,
                    "additional generation failure while draining"
                );
            }
        }

        if !step.newly_blocked.is_empty() {
            info!(
                program = %program,
                blocked = ?step.newly_blocked,
                "dependents will not be summarized"
            );
        }
    }

    conclude(step, options)
}

/// Handle a shutdown request: stop dispatching and cancel running work.
pub fn handle_shutdown(scheduler: &mut Scheduler) -> CoreStep {
    scheduler.halt();
    CoreStep {
        commands: vec![CoreCommand::AbortInFlight],
        keep_running: false,
    }
}

/// Turn a scheduler step into commands plus a keep-running decision.
fn conclude(step: SchedulerStep, options: &RuntimeOptions) -> CoreStep {
    let mut commands = Vec::new();
    if !step.newly_scheduled.is_empty() {
        commands.push(CoreCommand::DispatchPrograms(step.newly_scheduled));
    }

    let keep_running = match step.progress {
        RunProgress::NotStarted | RunProgress::InProgress => true,
        RunProgress::Complete => {
            info!("all programs summarized");
            false
        }
        RunProgress::Deadlocked { stuck } => {
            error!(?stuck, "no runnable programs remain; dependency cycle or deadlock");
            false
        }
        RunProgress::Halted { in_flight: 0 } => false,
        RunProgress::Halted { in_flight } => match options.failure_mode {
            FailureMode::Drain => {
                debug!(in_flight, "halted; draining in-flight generations");
                true
            }
            FailureMode::Abort => {
                info!(in_flight, "halted; aborting in-flight generations");
                commands.push(CoreCommand::AbortInFlight);
                false
            }
        },
    };

    CoreStep {
        commands,
        keep_running,
    }
}
