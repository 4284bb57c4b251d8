use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use sumdag::errors::GenerationError;
use sumdag::generate::{GenerationFuture, SummaryGenerator, ensure_dependency_summaries};
use sumdag::model::{Program, ProgramId};
use tracing::debug;

/// Which generator entry point was called.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Leaf,
    WithDeps,
}

/// Something the generator observed, in global order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenEvent {
    Started {
        program: ProgramId,
        variant: Variant,
        /// `(dependency id, summary as received)`.
        dependencies: Vec<(ProgramId, Option<String>)>,
    },
    Finished {
        program: ProgramId,
    },
}

/// A fake generator that:
/// - records every call and completion in order
/// - fails for configured programs
/// - sleeps a configurable (per-program) delay
/// - tracks the peak number of concurrent calls
///
/// Summaries are `"summary(<id>)"` for leaves and
/// `"summary(<id>)<-[<dep summaries>]"` otherwise.
#[derive(Debug, Clone, Default)]
pub struct RecordingGenerator {
    events: Arc<Mutex<Vec<GenEvent>>>,
    failing: HashSet<ProgramId>,
    delay: Duration,
    delays: HashMap<ProgramId, Duration>,
    running: Arc<AtomicUsize>,
    peak: Arc<AtomicUsize>,
}

impl RecordingGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, program: &str) -> Self {
        self.failing.insert(program.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_delay_for(mut self, program: &str, delay: Duration) -> Self {
        self.delays.insert(program.to_string(), delay);
        self
    }

    pub fn events(&self) -> Vec<GenEvent> {
        self.events.lock().unwrap().clone()
    }

    /// Program ids in the order their generation started.
    pub fn started_order(&self) -> Vec<ProgramId> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                GenEvent::Started { program, .. } => Some(program),
                GenEvent::Finished { .. } => None,
            })
            .collect()
    }

    pub fn calls_for(&self, program: &str) -> usize {
        self.started_order().iter().filter(|p| *p == program).count()
    }

    /// Variant and dependency inputs of the (first) call for `program`.
    pub fn call_for(&self, program: &str) -> Option<(Variant, Vec<(ProgramId, Option<String>)>)> {
        self.events().into_iter().find_map(|e| match e {
            GenEvent::Started {
                program: p,
                variant,
                dependencies,
            } if p == program => Some((variant, dependencies)),
            _ => None,
        })
    }

    /// Index of the `Started` event for `program`.
    pub fn started_at(&self, program: &str) -> Option<usize> {
        self.events().iter().position(
            |e| matches!(e, GenEvent::Started { program: p, .. } if p == program),
        )
    }

    /// Index of the `Finished` event for `program`.
    pub fn finished_at(&self, program: &str) -> Option<usize> {
        self.events().iter().position(
            |e| matches!(e, GenEvent::Finished { program: p } if p == program),
        )
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn expected_leaf_summary(program: &str) -> String {
        format!("summary({program})")
    }

    async fn record(
        &self,
        program: &Program,
        variant: Variant,
        dependencies: &[Program],
    ) -> Result<String, GenerationError> {
        debug!(program = %program.id, ?variant, "fake generation started");
        self.events.lock().unwrap().push(GenEvent::Started {
            program: program.id.clone(),
            variant,
            dependencies: dependencies
                .iter()
                .map(|d| (d.id.clone(), d.summary.clone()))
                .collect(),
        });

        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(&program.id).copied().unwrap_or(self.delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.running.fetch_sub(1, Ordering::SeqCst);

        if self.failing.contains(&program.id) {
            return Err(GenerationError::Service(format!("simulated failure for {}", program.id)));
        }
        ensure_dependency_summaries(dependencies)?;

        self.events.lock().unwrap().push(GenEvent::Finished {
            program: program.id.clone(),
        });

        let mut summary = Self::expected_leaf_summary(&program.id);
        if variant == Variant::WithDeps {
            let deps: Vec<String> = dependencies
                .iter()
                .map(|d| d.summary.clone().unwrap_or_default())
                .collect();
            summary.push_str(&format!("<-[{}]", deps.join(",")));
        }
        Ok(summary)
    }
}

impl SummaryGenerator for RecordingGenerator {
    fn generate_leaf<'a>(&'a self, program: &'a Program) -> GenerationFuture<'a> {
        Box::pin(self.record(program, Variant::Leaf, &[]))
    }

    fn generate_with_deps<'a>(
        &'a self,
        program: &'a Program,
        dependencies: &'a [Program],
    ) -> GenerationFuture<'a> {
        Box::pin(self.record(program, Variant::WithDeps, dependencies))
    }
}
