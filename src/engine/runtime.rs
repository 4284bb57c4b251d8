// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::ScheduledProgram;
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::model::Summaries;

use super::core::CoreRuntime;
use super::{CoreCommand, CoreStep, RuntimeEvent};

/// Drives the scheduler in response to `RuntimeEvent`s and delegates the
/// actual generation calls to an `ExecutorBackend`.
///
/// This is the single coordinating flow: completions are processed one at a
/// time, so readiness counts and the ready set are never mutated
/// concurrently.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
        }
    }

    /// Main event loop.
    ///
    /// - Dispatches the initial wave of leaf programs.
    /// - Consumes completion events and feeds them into the core.
    /// - Executes the commands the core returns until it asks to stop.
    pub async fn run(mut self) -> Result<Summaries> {
        info!("sumdag runtime started");

        let step = self.core.start()?;
        let mut keep_running = self.apply(step).await?;

        while keep_running {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    warn!("runtime event channel closed before the run concluded");
                    self.core.mark_interrupted();
                    break;
                }
            };

            match &event {
                RuntimeEvent::GenerationCompleted { program, outcome } => {
                    debug!(program = %program, ?outcome, "runtime received completion");
                }
                RuntimeEvent::ShutdownRequested => {
                    info!("shutdown requested");
                }
            }

            let step = self.core.step(event)?;
            keep_running = self.apply(step).await?;
        }

        info!("runtime exiting");
        self.core.finish()
    }

    async fn apply(&mut self, step: CoreStep) -> Result<bool> {
        for command in step.commands {
            self.execute_command(command).await?;
        }
        Ok(step.keep_running)
    }

    /// Execute a single command from the core.
    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchPrograms(programs) => self.spawn_ready(programs).await,
            CoreCommand::AbortInFlight => {
                self.executor.abort_in_flight();
                Ok(())
            }
        }
    }

    async fn spawn_ready(&mut self, programs: Vec<ScheduledProgram>) -> Result<()> {
        if programs.is_empty() {
            return Ok(());
        }

        let ids: Vec<_> = programs.iter().map(|p| p.id()).collect();
        debug!(?ids, "spawning ready programs");

        self.executor.spawn_ready(programs).await
    }
}
