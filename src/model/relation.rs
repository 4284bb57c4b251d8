// src/model/relation.rs

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::model::ProgramId;

/// Directed edge: `abap_program_id` depends on (relates to)
/// `related_abap_program_id`.
///
/// Several relations may connect the same pair, with the same or different
/// `relation_type`; the graph collapses them into a single dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relation {
    pub abap_program_id: ProgramId,
    pub relation_type: String,
    pub related_abap_program_id: ProgramId,
}

impl Relation {
    pub fn new(
        abap_program_id: impl Into<ProgramId>,
        relation_type: impl Into<String>,
        related_abap_program_id: impl Into<ProgramId>,
    ) -> Self {
        Self {
            abap_program_id: abap_program_id.into(),
            relation_type: relation_type.into(),
            related_abap_program_id: related_abap_program_id.into(),
        }
    }

    /// The dependent end of the edge.
    pub fn source(&self) -> &str {
        &self.abap_program_id
    }

    /// The depended-on end of the edge.
    pub fn target(&self) -> &str {
        &self.related_abap_program_id
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -[{}]-> {}",
            self.abap_program_id, self.relation_type, self.related_abap_program_id
        )
    }
}
