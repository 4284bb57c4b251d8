// src/dag/scheduler.rs

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::dag::graph::DependencyGraph;
use crate::dag::program_state::{ProgramInfo, ProgramRunState, RunState, ScheduledProgram};
use crate::dag::scheduler_step::{RunProgress, SchedulerStep};
use crate::dag::state_manager::StateManager;
use crate::errors::{Result, SumdagError};
use crate::model::ProgramId;
use crate::store::ResultStore;

/// Scheduler holds the immutable dependency graph plus mutable per-run state.
///
/// It is responsible for:
/// - tracking how many distinct dependencies each program still waits on
/// - dispatching ready programs, at most `max_in_flight` at a time
/// - storing summaries and releasing dependents on success
/// - blocking dependents and halting dispatch on failure
/// - reporting a deadlock when no progress is possible
///
/// It performs no IO and owns no Tokio types; the async runtime feeds it one
/// completion at a time.
#[derive(Debug)]
pub struct Scheduler {
    graph: Arc<DependencyGraph>,
    store: ResultStore,
    programs: HashMap<ProgramId, ProgramInfo>,
    /// Ready programs not yet dispatched, in id order.
    ready: BTreeSet<ProgramId>,
    in_flight: usize,
    max_in_flight: Option<usize>,
    started: bool,
    halted: bool,
}

impl Scheduler {
    /// Construct a scheduler over `graph`, writing summaries into `store`.
    ///
    /// `max_in_flight = None` dispatches every ready program immediately.
    pub fn new(graph: Arc<DependencyGraph>, store: ResultStore, max_in_flight: Option<usize>) -> Self {
        let programs = graph
            .all_ids()
            .map(|id| {
                let count = graph.dependencies_of(id).len();
                (id.to_string(), ProgramInfo::new(id.to_string(), count))
            })
            .collect();

        Self {
            graph,
            store,
            programs,
            ready: BTreeSet::new(),
            in_flight: 0,
            max_in_flight: max_in_flight.map(|n| n.max(1)),
            started: false,
            halted: false,
        }
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Number of dispatched programs that have not reported back.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn is_halted(&self) -> bool {
        self.halted
    }

    /// Read-only view of the given program's run state.
    pub fn run_state_of(&self, program: &str) -> Option<ProgramRunState> {
        self.programs.get(program).map(|info| info.state.into())
    }

    /// Distinct dependencies of `program` still lacking a summary.
    pub fn remaining_dependencies(&self, program: &str) -> Option<usize> {
        self.programs.get(program).map(|info| info.remaining)
    }

    /// Programs without a stored summary, sorted.
    pub fn unresolved(&self) -> Vec<ProgramId> {
        let mut ids: Vec<ProgramId> = self
            .programs
            .values()
            .filter(|info| info.state != RunState::Done)
            .map(|info| info.id.clone())
            .collect();
        ids.sort();
        ids
    }

    /// Seed the run with every leaf program and dispatch what fits.
    pub fn start(&mut self) -> Result<SchedulerStep> {
        if self.started {
            warn!("scheduler already started; ignoring");
            return Ok(SchedulerStep::idle(self.progress()));
        }
        self.started = true;

        let mut manager = StateManager::new(&self.graph, &mut self.programs);
        let leaves = manager.seed_leaves();
        info!(
            programs = self.graph.len(),
            leaves = leaves.len(),
            max_in_flight = ?self.max_in_flight,
            "scheduler: starting run"
        );
        self.ready.extend(leaves);

        let newly_scheduled = self.dispatch_ready()?;
        Ok(SchedulerStep {
            newly_scheduled,
            newly_blocked: Vec::new(),
            progress: self.progress(),
        })
    }

    /// Record a successful generation for `program`.
    ///
    /// The summary is stored *before* any dependent is released, so every
    /// program dispatched by this step reads a complete set of dependency
    /// summaries. Completions for programs that are not running are ignored.
    pub fn handle_success(&mut self, program: &str, summary: String) -> Result<SchedulerStep> {
        if !self.take_running(program) {
            return Ok(SchedulerStep::idle(self.progress()));
        }

        self.store.insert(program, summary)?;
        if let Some(info) = self.programs.get_mut(program) {
            info.state = RunState::Done;
        }
        debug!(program = %program, in_flight = self.in_flight, "summary generated");

        let mut manager = StateManager::new(&self.graph, &mut self.programs);
        let released = manager.release_dependents(program);
        self.ready.extend(released);

        let newly_scheduled = self.dispatch_ready()?;
        Ok(SchedulerStep {
            newly_scheduled,
            newly_blocked: Vec::new(),
            progress: self.progress(),
        })
    }

    /// Record a failed generation for `program`.
    ///
    /// Halts dispatching and blocks every transitive dependent that has not
    /// been launched. Programs already in flight are left to report back.
    pub fn handle_failure(&mut self, program: &str) -> SchedulerStep {
        if !self.take_running(program) {
            return SchedulerStep::idle(self.progress());
        }

        if let Some(info) = self.programs.get_mut(program) {
            info.state = RunState::Failed;
        }
        warn!(program = %program, "generation failed; halting dispatch and blocking dependents");
        self.halted = true;

        let mut manager = StateManager::new(&self.graph, &mut self.programs);
        let newly_blocked = manager.mark_dependents_blocked(program);
        for id in &newly_blocked {
            self.ready.remove(id);
        }

        SchedulerStep {
            newly_scheduled: Vec::new(),
            newly_blocked,
            progress: self.progress(),
        }
    }

    /// Stop dispatching new work (e.g. on shutdown).
    pub fn halt(&mut self) {
        if !self.halted {
            info!(in_flight = self.in_flight, "scheduler: halting dispatch");
        }
        self.halted = true;
    }

    /// Current run status; see [`RunProgress`].
    pub fn progress(&self) -> RunProgress {
        if !self.started {
            return RunProgress::NotStarted;
        }

        if self.programs.values().all(|info| info.state == RunState::Done) {
            return RunProgress::Complete;
        }
        if self.halted {
            return RunProgress::Halted {
                in_flight: self.in_flight,
            };
        }
        if self.in_flight == 0 && self.ready.is_empty() {
            return RunProgress::Deadlocked {
                stuck: self.unresolved(),
            };
        }
        RunProgress::InProgress
    }

    /// Transition `program` out of `Running`, returning `false` (and logging)
    /// if it was not running.
    fn take_running(&mut self, program: &str) -> bool {
        match self.programs.get(program).map(|info| info.state) {
            Some(RunState::Running) => {
                self.in_flight = self.in_flight.saturating_sub(1);
                true
            }
            Some(state) => {
                warn!(program = %program, ?state, "completion for program that is not running; ignoring");
                false
            }
            None => {
                warn!(program = %program, "completion for unknown program; ignoring");
                false
            }
        }
    }

    fn has_capacity(&self) -> bool {
        self.max_in_flight.is_none_or(|max| self.in_flight < max)
    }

    /// Pop ready programs while capacity allows, mark them `Running` and
    /// resolve their inputs.
    fn dispatch_ready(&mut self) -> Result<Vec<ScheduledProgram>> {
        let mut scheduled = Vec::new();
        if self.halted {
            return Ok(scheduled);
        }

        while self.has_capacity() {
            let Some(id) = self.ready.pop_first() else {
                break;
            };

            let task = ScheduledProgram::resolve(&self.graph, &self.store, &id)?;
            if let Some(info) = self.programs.get_mut(&id) {
                info.state = RunState::Running;
            }
            self.in_flight += 1;

            info!(
                program = %id,
                dependencies = task.dependencies.len(),
                in_flight = self.in_flight,
                "dispatching summary generation"
            );
            scheduled.push(task);
        }

        Ok(scheduled)
    }
}

/// Group programs into the waves an unbounded run would dispatch: every
/// program in wave `n` depends only on programs in waves `< n`.
///
/// Uses the same counting rule as [`Scheduler`] and fails with
/// [`SumdagError::CycleOrDeadlock`]
/// when some programs can never become ready.
pub fn wavefronts(graph: &DependencyGraph) -> Result<Vec<Vec<ProgramId>>> {
    let mut remaining: HashMap<&str, usize> = graph
        .all_ids()
        .map(|id| (id, graph.dependencies_of(id).len()))
        .collect();

    let mut waves = Vec::new();
    let mut current: Vec<ProgramId> = graph.leaves().map(str::to_string).collect();
    let mut placed = 0;

    while !current.is_empty() {
        placed += current.len();
        let mut next = BTreeSet::new();

        for id in &current {
            for dependent in graph.dependents_of(id) {
                if let Some(count) = remaining.get_mut(dependent.as_str()) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        next.insert(dependent.clone());
                    }
                }
            }
        }

        waves.push(current);
        current = next.into_iter().collect();
    }

    if placed < graph.len() {
        let placed_ids: BTreeSet<&str> = waves.iter().flatten().map(String::as_str).collect();
        let stuck: Vec<ProgramId> = graph
            .all_ids()
            .filter(|id| !placed_ids.contains(id))
            .map(str::to_string)
            .collect();
        let cycles = graph.find_cycles(&stuck);
        return Err(SumdagError::CycleOrDeadlock { stuck, cycles });
    }

    Ok(waves)
}
