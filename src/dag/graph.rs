// src/dag/graph.rs

use std::collections::{BTreeMap, BTreeSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, warn};

use crate::errors::{Result, SumdagError, UnknownDependency};
use crate::model::{Program, ProgramId, Relation};

static NO_IDS: BTreeSet<ProgramId> = BTreeSet::new();

/// Internal node structure: the program plus its immediate deps and dependents.
#[derive(Debug, Clone)]
struct ProgramNode {
    program: Program,
    /// Distinct programs whose summaries this one needs.
    deps: BTreeSet<ProgramId>,
    /// Distinct programs that need this one's summary.
    dependents: BTreeSet<ProgramId>,
}

/// In-memory dependency graph keyed by program id.
///
/// Read-only after [`DependencyGraph::build`]. Acyclicity is *not* checked
/// here; a cycle surfaces later as a scheduler deadlock.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: BTreeMap<ProgramId, ProgramNode>,
    dropped: Vec<UnknownDependency>,
}

impl DependencyGraph {
    /// Build the graph from a flat list of programs and relations.
    ///
    /// - Program ids must be unique ([`SumdagError::DuplicateId`] otherwise).
    /// - Relations whose endpoints are not both known are dropped and kept
    ///   in [`dropped_relations`](Self::dropped_relations).
    /// - Repeated relations between the same pair collapse to one edge,
    ///   whatever their `relation_type`.
    pub fn build(programs: Vec<Program>, relations: &[Relation]) -> Result<Self> {
        let mut nodes: BTreeMap<ProgramId, ProgramNode> = BTreeMap::new();

        for program in programs {
            if nodes.contains_key(&program.id) {
                return Err(SumdagError::DuplicateId(program.id));
            }
            nodes.insert(
                program.id.clone(),
                ProgramNode {
                    program,
                    deps: BTreeSet::new(),
                    dependents: BTreeSet::new(),
                },
            );
        }

        let mut dropped = Vec::new();

        for relation in relations {
            let missing = [relation.source(), relation.target()]
                .into_iter()
                .find(|id| !nodes.contains_key(*id));

            if let Some(missing) = missing {
                let unknown = UnknownDependency {
                    relation: relation.clone(),
                    missing: missing.to_string(),
                };
                warn!(error = %unknown, "dropping relation");
                dropped.push(unknown);
                continue;
            }

            if let Some(node) = nodes.get_mut(relation.source()) {
                node.deps.insert(relation.target().to_string());
            }
            if let Some(node) = nodes.get_mut(relation.target()) {
                node.dependents.insert(relation.source().to_string());
            }
        }

        let graph = Self { nodes, dropped };
        debug!(
            programs = graph.len(),
            edges = graph.edge_count(),
            dropped = graph.dropped.len(),
            "dependency graph built"
        );
        Ok(graph)
    }

    /// All program ids, in id order.
    pub fn all_ids(&self) -> impl Iterator<Item = &str> {
        self.nodes.keys().map(|s| s.as_str())
    }

    pub fn program(&self, id: &str) -> Option<&Program> {
        self.nodes.get(id).map(|n| &n.program)
    }

    pub fn programs(&self) -> impl Iterator<Item = &Program> {
        self.nodes.values().map(|n| &n.program)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    /// Programs whose summaries `id` needs as input.
    pub fn dependencies_of(&self, id: &str) -> &BTreeSet<ProgramId> {
        self.nodes.get(id).map(|n| &n.deps).unwrap_or(&NO_IDS)
    }

    /// Programs that list `id` as a dependency.
    pub fn dependents_of(&self, id: &str) -> &BTreeSet<ProgramId> {
        self.nodes.get(id).map(|n| &n.dependents).unwrap_or(&NO_IDS)
    }

    /// Programs without dependencies.
    pub fn leaves(&self) -> impl Iterator<Item = &str> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.deps.is_empty())
            .map(|(id, _)| id.as_str())
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of distinct dependency edges.
    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|n| n.deps.len()).sum()
    }

    /// Relations that were discarded at build time.
    pub fn dropped_relations(&self) -> &[UnknownDependency] {
        &self.dropped
    }

    /// Dependency cycles among the given programs.
    ///
    /// Returns every strongly connected component of the induced subgraph
    /// that has more than one member, or a single member depending on
    /// itself. Members and components are sorted.
    pub fn find_cycles(&self, among: &[ProgramId]) -> Vec<Vec<ProgramId>> {
        let members: BTreeSet<&str> = among
            .iter()
            .map(|s| s.as_str())
            .filter(|id| self.contains(id))
            .collect();

        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for id in &members {
            graph.add_node(*id);
        }
        for id in &members {
            for dep in self.dependencies_of(id) {
                if members.contains(dep.as_str()) {
                    graph.add_edge(*id, dep.as_str(), ());
                }
            }
        }

        let mut cycles: Vec<Vec<ProgramId>> = tarjan_scc(&graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
            .map(|scc| {
                let mut ids: Vec<ProgramId> = scc.into_iter().map(str::to_string).collect();
                ids.sort();
                ids
            })
            .collect();
        cycles.sort();
        cycles
    }
}
