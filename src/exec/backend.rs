// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of spawning tasks
//! itself. Production code uses [`GeneratorBackend`]; tests can provide an
//! implementation that records dispatches and emits completion events
//! directly.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info};

use crate::dag::ScheduledProgram;
use crate::engine::RuntimeEvent;
use crate::errors::Result;
use crate::generate::SummaryGenerator;

use super::task_runner::run_generation;

/// Trait abstracting how scheduled programs are generated.
pub trait ExecutorBackend: Send {
    /// Start generation for the given programs without waiting for them.
    ///
    /// Every program must eventually produce exactly one
    /// `RuntimeEvent::GenerationCompleted`, unless aborted.
    fn spawn_ready(
        &mut self,
        programs: Vec<ScheduledProgram>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;

    /// Cancel any generation still running. Default: no-op.
    fn abort_in_flight(&mut self) {}
}

/// Backend that runs each generation call on its own Tokio task.
pub struct GeneratorBackend {
    generator: Arc<dyn SummaryGenerator>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    timeout: Option<Duration>,
    tasks: JoinSet<()>,
}

impl GeneratorBackend {
    pub fn new(
        generator: Arc<dyn SummaryGenerator>,
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        timeout: Option<Duration>,
    ) -> Self {
        Self {
            generator,
            runtime_tx,
            timeout,
            tasks: JoinSet::new(),
        }
    }
}

impl ExecutorBackend for GeneratorBackend {
    fn spawn_ready(
        &mut self,
        programs: Vec<ScheduledProgram>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        Box::pin(async move {
            // Reap finished tasks so the set only tracks live work.
            while self.tasks.try_join_next().is_some() {}

            for program in programs {
                debug!(program = %program.id(), leaf = program.is_leaf(), "spawning generation task");
                self.tasks.spawn(run_generation(
                    program,
                    Arc::clone(&self.generator),
                    self.timeout,
                    self.runtime_tx.clone(),
                ));
            }
            Ok(())
        })
    }

    fn abort_in_flight(&mut self) {
        info!(tasks = self.tasks.len(), "aborting in-flight generation tasks");
        self.tasks.abort_all();
    }
}
