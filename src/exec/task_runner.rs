// src/exec/task_runner.rs

//! Single generation call runner.

use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tracing::{debug, error, info};

use crate::dag::ScheduledProgram;
use crate::engine::{GenerationOutcome, RuntimeEvent};
use crate::errors::GenerationError;
use crate::generate::SummaryGenerator;

/// Run the generation for one program and report the outcome.
///
/// The generator call runs on its own task so a panicking generator is
/// reported as a failed generation instead of a lost completion. Exactly one
/// `GenerationCompleted` event is sent, unless the runtime has already gone
/// away.
pub async fn run_generation(
    task: ScheduledProgram,
    generator: Arc<dyn SummaryGenerator>,
    timeout: Option<Duration>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let program = task.id().to_string();
    let started = Instant::now();

    let call = tokio::spawn(async move { generate(&task, generator.as_ref(), timeout).await });
    // Aborting this task (abort mode, shutdown) must cancel the call too.
    let _abort_call = AbortOnDrop(call.abort_handle());

    let result = match call.await {
        Ok(result) => result,
        Err(join_err) if join_err.is_panic() => Err(GenerationError::Service(format!(
            "generator panicked: {}",
            panic_message(join_err.into_panic())
        ))),
        Err(join_err) => Err(GenerationError::Service(format!(
            "generation task cancelled: {join_err}"
        ))),
    };

    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    let outcome = match result {
        Ok(summary) => {
            info!(program = %program, elapsed_ms, "summary generated");
            GenerationOutcome::Summary(summary)
        }
        Err(err) => {
            error!(program = %program, elapsed_ms, error = %err, "summary generation failed");
            GenerationOutcome::Failed(err)
        }
    };

    let event = RuntimeEvent::GenerationCompleted {
        program: program.clone(),
        outcome,
    };
    if runtime_tx.send(event).await.is_err() {
        debug!(program = %program, "runtime gone; dropping generation result");
    }
}

struct AbortOnDrop(AbortHandle);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    match payload.downcast::<String>() {
        Ok(msg) => *msg,
        Err(payload) => match payload.downcast::<&'static str>() {
            Ok(msg) => (*msg).to_string(),
            Err(_) => "non-string panic payload".to_string(),
        },
    }
}

/// Call the generator variant matching the program's dependencies, with an
/// optional time limit.
pub async fn generate(
    task: &ScheduledProgram,
    generator: &dyn SummaryGenerator,
    timeout: Option<Duration>,
) -> Result<String, GenerationError> {
    let call = if task.is_leaf() {
        generator.generate_leaf(&task.program)
    } else {
        generator.generate_with_deps(&task.program, &task.dependencies)
    };

    match timeout {
        None => call.await,
        Some(limit) => tokio::time::timeout(limit, call)
            .await
            .unwrap_or(Err(GenerationError::Timeout(limit))),
    }
}
