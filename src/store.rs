// src/store.rs

//! In-memory result store shared between the coordinator and callers.
//!
//! The store is the single source of truth for "is this program's summary
//! available". The coordinator writes a summary before releasing any of the
//! program's dependents, and dependents read it back when their generation
//! task is built, so a dependent never observes a missing or partial value.
//!
//! Handles are cheap to clone. Keep one around to inspect partial results
//! after a failed run.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::errors::{Result, SumdagError};
use crate::model::{ProgramId, Summaries};

#[derive(Debug, Clone, Default)]
pub struct ResultStore {
    inner: Arc<RwLock<Summaries>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the summary for `program`.
    ///
    /// Each key is written at most once; a second write fails with
    /// [`SumdagError::SummaryAlreadyRecorded`] and leaves the first value.
    pub fn insert(&self, program: &str, summary: String) -> Result<()> {
        let mut map = self.write()?;
        if map.contains_key(program) {
            return Err(SumdagError::SummaryAlreadyRecorded(program.to_string()));
        }
        debug!(program = %program, len = summary.len(), "storing summary");
        map.insert(program.to_string(), summary);
        Ok(())
    }

    pub fn get(&self, program: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(program).cloned())
    }

    pub fn contains(&self, program: &str) -> Result<bool> {
        Ok(self.read()?.contains_key(program))
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read()?.is_empty())
    }

    /// Ids that have a summary, in id order.
    pub fn ids(&self) -> Result<Vec<ProgramId>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    /// Copy of everything recorded so far.
    pub fn snapshot(&self) -> Result<Summaries> {
        Ok(self.read()?.clone())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Summaries>> {
        self.inner.read().map_err(|_| SumdagError::StorePoisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Summaries>> {
        self.inner.write().map_err(|_| SumdagError::StorePoisoned)
    }
}
