// tests/scheduler_properties.rs

use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;

use proptest::prelude::*;
use sumdag::dag::{DependencyGraph, RunProgress, Scheduler, wavefronts};
use sumdag::store::ResultStore;
use sumdag_test_utils::builders::GraphBuilder;

// Random acyclic graphs: program N may only depend on programs 0..N-1.
fn dag_strategy(max_programs: usize) -> impl Strategy<Value = DependencyGraph> {
    (1..=max_programs).prop_flat_map(|count| {
        proptest::collection::vec(proptest::collection::vec(any::<usize>(), 0..4), count).prop_map(
            move |raw_deps| {
                let mut builder = GraphBuilder::new();
                for (i, potential) in raw_deps.into_iter().enumerate() {
                    let id = format!("P{i:02}");
                    // Duplicates are kept on purpose; the graph collapses them.
                    let deps: Vec<String> = if i == 0 {
                        Vec::new()
                    } else {
                        potential.iter().map(|d| format!("P{:02}", d % i)).collect()
                    };
                    let deps: Vec<&str> = deps.iter().map(String::as_str).collect();
                    builder = builder.program_with_deps(&id, &deps);
                }
                builder.build_graph()
            },
        )
    })
}

proptest! {
    #[test]
    fn every_program_runs_once_after_its_dependencies(
        graph in dag_strategy(12),
        cap in proptest::option::of(1..4usize),
        picks in proptest::collection::vec(any::<usize>(), 64),
    ) {
        let graph = Arc::new(graph);
        let mut scheduler = Scheduler::new(Arc::clone(&graph), ResultStore::new(), cap);

        let mut running: Vec<String> = Vec::new();
        let mut done: HashSet<String> = HashSet::new();
        let mut dispatched: BTreeSet<String> = BTreeSet::new();
        let mut picks = picks.into_iter().cycle();

        let mut step = scheduler.start().expect("start");
        let mut rounds = 0;

        loop {
            for task in &step.newly_scheduled {
                let id = task.id().to_string();
                prop_assert!(dispatched.insert(id.clone()), "{} dispatched twice", id);
                for dep in graph.dependencies_of(&id) {
                    prop_assert!(done.contains(dep), "{} dispatched before {}", id, dep);
                }
                let received: Vec<&str> = task.dependencies.iter().map(|d| d.id.as_str()).collect();
                let expected: Vec<&str> = graph.dependencies_of(&id).iter().map(String::as_str).collect();
                prop_assert_eq!(received, expected);
                prop_assert!(task.dependencies.iter().all(|d| d.has_summary()));
                running.push(id);
            }

            if let Some(max) = cap {
                prop_assert!(scheduler.in_flight() <= max);
            }
            prop_assert_eq!(scheduler.in_flight(), running.len());

            if step.progress.is_terminal() || running.is_empty() {
                break;
            }

            // Complete an arbitrary in-flight program.
            let pick = picks.next().unwrap_or(0) % running.len();
            let id = running.swap_remove(pick);
            done.insert(id.clone());
            step = scheduler.handle_success(&id, format!("summary {id}")).expect("success");

            rounds += 1;
            prop_assert!(rounds <= graph.len());
        }

        prop_assert_eq!(step.progress, RunProgress::Complete);
        prop_assert_eq!(dispatched.len(), graph.len());
        prop_assert_eq!(scheduler.store().len().expect("store"), graph.len());
    }

    #[test]
    fn wavefronts_cover_every_program_once(graph in dag_strategy(12)) {
        let waves = wavefronts(&graph).expect("acyclic");
        let mut level = std::collections::HashMap::new();
        for (n, wave) in waves.iter().enumerate() {
            for id in wave {
                prop_assert!(level.insert(id.clone(), n).is_none());
            }
        }
        prop_assert_eq!(level.len(), graph.len());

        for id in graph.all_ids() {
            for dep in graph.dependencies_of(id) {
                prop_assert!(level[dep] < level[id]);
            }
        }
    }
}
