// src/dag/scheduler_step.rs

//! Step-by-step result types for the scheduler.

use crate::dag::program_state::ScheduledProgram;
use crate::model::ProgramId;

/// Where a run stands after a scheduler step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunProgress {
    /// `start` has not been called yet.
    NotStarted,
    /// Work is in flight or queued.
    InProgress,
    /// Every program has a summary.
    Complete,
    /// A failure or shutdown stopped dispatching; `in_flight` tasks may
    /// still report back.
    Halted { in_flight: usize },
    /// Nothing in flight, nothing ready, programs still unsummarized.
    Deadlocked { stuck: Vec<ProgramId> },
}

impl RunProgress {
    /// Whether the coordinator can stop waiting for completions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunProgress::Complete
                | RunProgress::Deadlocked { .. }
                | RunProgress::Halted { in_flight: 0 }
        )
    }
}

/// Structured result of a single scheduler step.
#[derive(Debug, Clone)]
pub struct SchedulerStep {
    /// Programs dispatched as a result of this step.
    pub newly_scheduled: Vec<ScheduledProgram>,
    /// Programs newly marked as blocked by an upstream failure.
    pub newly_blocked: Vec<ProgramId>,
    pub progress: RunProgress,
}

impl SchedulerStep {
    pub(crate) fn idle(progress: RunProgress) -> Self {
        Self {
            newly_scheduled: Vec::new(),
            newly_blocked: Vec::new(),
            progress,
        }
    }

    pub fn scheduled_ids(&self) -> Vec<&str> {
        self.newly_scheduled.iter().map(|s| s.id()).collect()
    }
}
