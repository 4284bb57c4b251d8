// src/engine/summarizer.rs

//! Wiring of graph, generator, scheduler and runtime into a single run.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::dag::{DependencyGraph, Scheduler};
use crate::engine::{CoreRuntime, EngineOptions, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::Result;
use crate::exec::GeneratorBackend;
use crate::generate::SummaryGenerator;
use crate::model::Summaries;
use crate::store::ResultStore;

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// One summarization run over a dependency graph.
///
/// ```no_run
/// # use std::sync::Arc;
/// # use std::time::Duration;
/// # use sumdag::dag::DependencyGraph;
/// # use sumdag::engine::{EngineOptions, Summarizer};
/// # use sumdag::generate::TemplateGenerator;
/// # async fn demo(graph: DependencyGraph) -> sumdag::errors::Result<()> {
/// let generator = Arc::new(TemplateGenerator::new(Duration::from_millis(10)));
/// let summarizer = Summarizer::new(graph, generator, EngineOptions::default());
/// let store = summarizer.store();
/// match summarizer.run().await {
///     Ok(summaries) => println!("{} summaries", summaries.len()),
///     Err(err) => println!("failed: {err}; {} kept", store.len()?),
/// }
/// # Ok(())
/// # }
/// ```
pub struct Summarizer {
    graph: Arc<DependencyGraph>,
    generator: Arc<dyn SummaryGenerator>,
    options: EngineOptions,
    store: ResultStore,
    event_tx: mpsc::Sender<RuntimeEvent>,
    event_rx: mpsc::Receiver<RuntimeEvent>,
}

impl Summarizer {
    pub fn new(graph: DependencyGraph, generator: Arc<dyn SummaryGenerator>, options: EngineOptions) -> Self {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            graph: Arc::new(graph),
            generator,
            options,
            store: ResultStore::new(),
            event_tx,
            event_rx,
        }
    }

    /// Handle to the store this run writes into. Summaries recorded before a
    /// failure remain readable through it.
    pub fn store(&self) -> ResultStore {
        self.store.clone()
    }

    /// Sender for injecting [`RuntimeEvent::ShutdownRequested`].
    pub fn event_sender(&self) -> mpsc::Sender<RuntimeEvent> {
        self.event_tx.clone()
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Summarize every program, dependencies first.
    pub async fn run(self) -> Result<Summaries> {
        let Self {
            graph,
            generator,
            options,
            store,
            event_tx,
            event_rx,
        } = self;

        let scheduler = Scheduler::new(graph, store, options.max_in_flight);
        let executor = GeneratorBackend::new(generator, event_tx, options.generation_timeout);
        let core = CoreRuntime::new(
            scheduler,
            RuntimeOptions {
                failure_mode: options.failure_mode,
            },
        );

        Runtime::new(core, event_rx, executor).run().await
    }
}

/// Convenience: run a [`Summarizer`] and return its result.
pub async fn summarize(
    graph: DependencyGraph,
    generator: Arc<dyn SummaryGenerator>,
    options: EngineOptions,
) -> Result<Summaries> {
    Summarizer::new(graph, generator, options).run().await
}
