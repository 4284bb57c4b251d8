// src/model/program.rs

use serde::{Deserialize, Serialize};

/// Canonical program identity type used throughout the crate.
///
/// Ids are supplied by the caller (e.g. the CSV export) and never
/// regenerated.
pub type ProgramId = String;

/// A unit of legacy code to be summarized; a node in the dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    pub id: ProgramId,

    pub display_name: String,

    /// Object type (report, class, function group, ...).
    #[serde(rename = "type")]
    pub kind: String,

    pub package_name: String,

    /// URI of the object in the source system. Not used by the core.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub uri: String,

    /// Raw source code. Not used by the core.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source_code: String,

    /// Generated summary. Unset until the scheduler has produced it.
    #[serde(default)]
    pub summary: Option<String>,
}

impl Program {
    pub fn new(
        id: impl Into<ProgramId>,
        display_name: impl Into<String>,
        kind: impl Into<String>,
        package_name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            kind: kind.into(),
            package_name: package_name.into(),
            uri: String::new(),
            source_code: String::new(),
            summary: None,
        }
    }

    /// Return a copy of this program with its summary set.
    pub fn with_summary(&self, summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..self.clone()
        }
    }

    pub fn has_summary(&self) -> bool {
        self.summary.is_some()
    }
}
