// src/dag/state_manager.rs

//! Per-run state transitions for programs in the scheduler.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::dag::DependencyGraph;
use crate::dag::program_state::{ProgramInfo, RunState};
use crate::model::ProgramId;

/// Applies completion and failure transitions to the per-program state map.
pub(crate) struct StateManager<'a> {
    graph: &'a DependencyGraph,
    programs: &'a mut HashMap<ProgramId, ProgramInfo>,
}

impl<'a> StateManager<'a> {
    pub fn new(graph: &'a DependencyGraph, programs: &'a mut HashMap<ProgramId, ProgramInfo>) -> Self {
        Self { graph, programs }
    }

    /// Mark every program without dependencies as `Ready` and return them.
    pub fn seed_leaves(&mut self) -> Vec<ProgramId> {
        let mut ready = Vec::new();
        for info in self.programs.values_mut() {
            if info.state == RunState::Waiting && info.remaining == 0 {
                info.state = RunState::Ready;
                ready.push(info.id.clone());
            }
        }
        ready.sort();
        ready
    }

    /// Decrement the remaining-dependency count of every dependent of
    /// `completed`; dependents reaching zero become `Ready` and are returned.
    pub fn release_dependents(&mut self, completed: &str) -> Vec<ProgramId> {
        let mut ready = Vec::new();

        for dependent in self.graph.dependents_of(completed) {
            let Some(info) = self.programs.get_mut(dependent) else {
                warn!(program = %dependent, "dependent missing from state map");
                continue;
            };

            if info.remaining == 0 {
                warn!(
                    program = %info.id,
                    dependency = %completed,
                    "dependency count already zero; ignoring release"
                );
                continue;
            }

            info.remaining -= 1;
            debug!(
                program = %info.id,
                dependency = %completed,
                remaining = info.remaining,
                "dependency resolved"
            );

            if info.remaining == 0 && info.state == RunState::Waiting {
                info.state = RunState::Ready;
                ready.push(info.id.clone());
            }
        }

        ready
    }

    /// Mark every transitive dependent of a failed program that has not been
    /// launched yet as `Blocked`, returning the newly blocked ids.
    pub fn mark_dependents_blocked(&mut self, failed: &str) -> Vec<ProgramId> {
        let graph = self.graph;
        let mut stack: Vec<&ProgramId> = graph.dependents_of(failed).iter().collect();
        let mut newly_blocked = Vec::new();

        while let Some(id) = stack.pop() {
            if let Some(info) = self.programs.get_mut(id) {
                match info.state {
                    RunState::Waiting | RunState::Ready => {
                        info.state = RunState::Blocked;
                        debug!(
                            program = %info.id,
                            upstream = %failed,
                            "blocking dependent due to upstream failure"
                        );
                        newly_blocked.push(info.id.clone());
                        stack.extend(graph.dependents_of(id));
                    }
                    // Already terminal, or in flight and left to finish.
                    RunState::Running | RunState::Done | RunState::Failed | RunState::Blocked => {}
                }
            }
        }

        newly_blocked.sort();
        newly_blocked
    }
}
