// src/model/mod.rs

//! Entity model: programs (graph nodes) and relations (graph edges).
//!
//! - [`program`] holds the `Program` record and its identity type.
//! - [`relation`] holds the directed `Relation` record.

pub mod program;
pub mod relation;

pub use program::{Program, ProgramId};
pub use relation::Relation;

/// Final output of a run: every program id mapped to its summary.
pub type Summaries = std::collections::BTreeMap<ProgramId, String>;
