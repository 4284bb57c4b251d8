// src/errors.rs

//! Crate-wide error types.

use std::time::Duration;

use thiserror::Error;

use crate::model::{ProgramId, Relation};

#[derive(Error, Debug)]
pub enum SumdagError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Duplicate program id: {0}")]
    DuplicateId(ProgramId),

    #[error("Program not found: {0}")]
    ProgramNotFound(ProgramId),

    #[error("Summary for program '{0}' was already recorded")]
    SummaryAlreadyRecorded(ProgramId),

    #[error("Program '{program}' was scheduled before dependency '{dependency}' had a summary")]
    MissingDependencySummary {
        program: ProgramId,
        dependency: ProgramId,
    },

    #[error("Summary generation failed for program '{program}': {source}")]
    Generation {
        program: ProgramId,
        #[source]
        source: GenerationError,
        /// Programs without a summary when the run stopped.
        unresolved: Vec<ProgramId>,
    },

    #[error("No runnable programs remain; stuck programs: {stuck:?}")]
    CycleOrDeadlock {
        stuck: Vec<ProgramId>,
        /// Dependency cycles found among the stuck programs.
        cycles: Vec<Vec<ProgramId>>,
    },

    #[error("Run interrupted with {} programs unresolved", .unresolved.len())]
    Interrupted { unresolved: Vec<ProgramId> },

    #[error("Result store lock poisoned")]
    StorePoisoned,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SumdagError {
    /// Programs left without a summary, for the error kinds that track them.
    pub fn unresolved(&self) -> &[ProgramId] {
        match self {
            SumdagError::Generation { unresolved, .. } => unresolved,
            SumdagError::Interrupted { unresolved } => unresolved,
            SumdagError::CycleOrDeadlock { stuck, .. } => stuck,
            _ => &[],
        }
    }
}

/// Failure of a single summary-generation call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("summary for dependency '{0}' is not available")]
    MissingDependencySummary(ProgramId),

    #[error("generation timed out after {0:?}")]
    Timeout(Duration),

    #[error("generation service error: {0}")]
    Service(String),
}

/// A relation dropped at graph build time because one of its endpoints is
/// not a known program. Never fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("relation {relation} references unknown program '{missing}'")]
pub struct UnknownDependency {
    pub relation: Relation,
    pub missing: ProgramId,
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, SumdagError>;
