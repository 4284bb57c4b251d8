use sumdag::dag::DependencyGraph;
use sumdag::model::{Program, Relation};

/// Program with display name and package derived from the id.
pub fn program(id: &str) -> Program {
    Program::new(id, format!("Z_{id}"), "PROG", "ZPKG")
}

/// `source` depends on `target`.
pub fn relation(source: &str, target: &str) -> Relation {
    Relation::new(source, "CALLS", target)
}

/// Builder for program/relation fixtures.
///
/// ```ignore
/// let graph = GraphBuilder::new()
///     .program("A")
///     .program_with_deps("B", &["A"])
///     .build_graph();
/// ```
#[derive(Debug, Default, Clone)]
pub struct GraphBuilder {
    programs: Vec<Program>,
    relations: Vec<Relation>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn program(mut self, id: &str) -> Self {
        self.programs.push(program(id));
        self
    }

    pub fn program_with_deps(mut self, id: &str, deps: &[&str]) -> Self {
        self.programs.push(program(id));
        for dep in deps {
            self.relations.push(relation(id, dep));
        }
        self
    }

    pub fn relation(mut self, source: &str, relation_type: &str, target: &str) -> Self {
        self.relations.push(Relation::new(source, relation_type, target));
        self
    }

    pub fn parts(self) -> (Vec<Program>, Vec<Relation>) {
        (self.programs, self.relations)
    }

    pub fn build_graph(self) -> DependencyGraph {
        DependencyGraph::build(self.programs, &self.relations)
            .expect("Failed to build graph from builder")
    }
}

/// A; B -> A; C -> A, B.
pub fn scenario_a() -> GraphBuilder {
    GraphBuilder::new()
        .program("A")
        .program_with_deps("B", &["A"])
        .program_with_deps("C", &["A", "B"])
}

/// X <-> Y.
pub fn scenario_cycle() -> GraphBuilder {
    GraphBuilder::new()
        .program_with_deps("X", &["Y"])
        .program_with_deps("Y", &["X"])
}

/// A; B -> A; C -> A, D -> B, C.
pub fn diamond() -> GraphBuilder {
    GraphBuilder::new()
        .program("A")
        .program_with_deps("B", &["A"])
        .program_with_deps("C", &["A"])
        .program_with_deps("D", &["B", "C"])
}
