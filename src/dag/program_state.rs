// src/dag/program_state.rs

//! Per-program run state and the scheduled-work description.

use crate::dag::DependencyGraph;
use crate::errors::{Result, SumdagError};
use crate::model::{Program, ProgramId};
use crate::store::ResultStore;

/// Per-run state of a program (internal).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RunState {
    /// Waiting on at least one dependency.
    Waiting,
    /// All dependencies summarized; queued for dispatch.
    Ready,
    /// Generation task dispatched and not yet reported back.
    Running,
    /// Summary stored.
    Done,
    /// Generation failed.
    Failed,
    /// Never launched because an upstream program failed.
    Blocked,
}

/// Public, read-only view of a program's run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgramRunState {
    Waiting,
    Ready,
    Running,
    Done,
    Failed,
    Blocked,
}

impl From<RunState> for ProgramRunState {
    fn from(state: RunState) -> Self {
        match state {
            RunState::Waiting => ProgramRunState::Waiting,
            RunState::Ready => ProgramRunState::Ready,
            RunState::Running => ProgramRunState::Running,
            RunState::Done => ProgramRunState::Done,
            RunState::Failed => ProgramRunState::Failed,
            RunState::Blocked => ProgramRunState::Blocked,
        }
    }
}

/// Scheduling bookkeeping for a single program.
#[derive(Debug, Clone)]
pub(crate) struct ProgramInfo {
    pub id: ProgramId,
    /// Distinct dependencies without a stored summary yet.
    pub remaining: usize,
    pub state: RunState,
}

impl ProgramInfo {
    pub fn new(id: ProgramId, dependency_count: usize) -> Self {
        Self {
            id,
            remaining: dependency_count,
            state: RunState::Waiting,
        }
    }
}

/// A program the scheduler wants generated now.
///
/// `dependencies` carries every depended-on program with its summary
/// already populated, in id order.
#[derive(Debug, Clone)]
pub struct ScheduledProgram {
    pub program: Program,
    pub dependencies: Vec<Program>,
}

impl ScheduledProgram {
    /// Resolve `id` and its dependency summaries from the graph and store.
    pub(crate) fn resolve(graph: &DependencyGraph, store: &ResultStore, id: &str) -> Result<Self> {
        let program = graph
            .program(id)
            .cloned()
            .ok_or_else(|| SumdagError::ProgramNotFound(id.to_string()))?;

        let mut dependencies = Vec::with_capacity(graph.dependencies_of(id).len());
        for dep_id in graph.dependencies_of(id) {
            let dep = graph
                .program(dep_id)
                .ok_or_else(|| SumdagError::ProgramNotFound(dep_id.clone()))?;
            let summary = store.get(dep_id)?.ok_or_else(|| SumdagError::MissingDependencySummary {
                program: id.to_string(),
                dependency: dep_id.clone(),
            })?;
            dependencies.push(dep.with_summary(summary));
        }

        Ok(Self {
            program,
            dependencies,
        })
    }

    pub fn id(&self) -> &str {
        &self.program.id
    }

    /// True when the program has no dependencies and takes the leaf path.
    pub fn is_leaf(&self) -> bool {
        self.dependencies.is_empty()
    }
}
