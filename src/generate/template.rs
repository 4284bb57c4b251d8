// src/generate/template.rs

use std::time::Duration;

use tracing::debug;

use crate::generate::{GenerationFuture, SummaryGenerator, ensure_dependency_summaries};
use crate::model::Program;

/// Generator that waits `latency` and renders a templated description.
///
/// Stands in for a real inference service: the delay models the call
/// latency, and the text is built from the program metadata alone.
#[derive(Debug, Clone, Default)]
pub struct TemplateGenerator {
    latency: Duration,
}

impl TemplateGenerator {
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }

    async fn wait(&self, program: &Program) {
        if !self.latency.is_zero() {
            debug!(program = %program.id, latency = ?self.latency, "simulating generation latency");
            tokio::time::sleep(self.latency).await;
        }
    }
}

/// Render the summary text for `program` and its dependencies.
pub fn render_summary(program: &Program, dependencies: &[Program]) -> String {
    let mut text = format!(
        "This program ({}) is a {} in the {} package.",
        program.display_name, program.kind, program.package_name
    );

    if !dependencies.is_empty() {
        text.push_str("\n\nIt has the following relations:\n");
        let lines: Vec<String> = dependencies
            .iter()
            .map(|dep| format!(" - {} ({})", dep.display_name, dep.kind))
            .collect();
        text.push_str(&lines.join("\n"));
    }

    text
}

impl SummaryGenerator for TemplateGenerator {
    fn generate_leaf<'a>(&'a self, program: &'a Program) -> GenerationFuture<'a> {
        Box::pin(async move {
            self.wait(program).await;
            Ok(render_summary(program, &[]))
        })
    }

    fn generate_with_deps<'a>(
        &'a self,
        program: &'a Program,
        dependencies: &'a [Program],
    ) -> GenerationFuture<'a> {
        Box::pin(async move {
            ensure_dependency_summaries(dependencies)?;
            self.wait(program).await;
            Ok(render_summary(program, dependencies))
        })
    }
}
