// src/generate/mod.rs

//! Summary generation boundary.
//!
//! The engine talks to a [`SummaryGenerator`] instead of a concrete
//! service. This keeps the scheduler independent of how summaries are
//! produced, and lets tests swap in a recording or failing generator.
//!
//! - [`template`] holds `TemplateGenerator`, the bundled implementation
//!   that renders a fixed description after a simulated service latency.

pub mod template;

use std::future::Future;
use std::pin::Pin;

use crate::errors::GenerationError;
use crate::model::Program;

pub use template::TemplateGenerator;

/// Boxed future returned by generator calls.
pub type GenerationFuture<'a> =
    Pin<Box<dyn Future<Output = std::result::Result<String, GenerationError>> + Send + 'a>>;

/// Long-latency, failable summary producer.
///
/// The scheduler guarantees that every program passed in `dependencies`
/// already carries its summary; implementations may reject inputs that
/// don't with [`GenerationError::MissingDependencySummary`].
pub trait SummaryGenerator: Send + Sync {
    /// Summarize a program that has no dependencies.
    fn generate_leaf<'a>(&'a self, program: &'a Program) -> GenerationFuture<'a>;

    /// Summarize a program given its already-summarized dependencies
    /// (in id order).
    fn generate_with_deps<'a>(
        &'a self,
        program: &'a Program,
        dependencies: &'a [Program],
    ) -> GenerationFuture<'a>;
}

/// Check the "dependencies are summarized" precondition.
pub fn ensure_dependency_summaries(dependencies: &[Program]) -> std::result::Result<(), GenerationError> {
    match dependencies.iter().find(|dep| !dep.has_summary()) {
        Some(dep) => Err(GenerationError::MissingDependencySummary(dep.id.clone())),
        None => Ok(()),
    }
}
