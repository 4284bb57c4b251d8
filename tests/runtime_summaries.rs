// tests/runtime_summaries.rs

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use sumdag::engine::{EngineOptions, RuntimeEvent, Summarizer, summarize};
use sumdag::errors::{GenerationError, SumdagError};
use sumdag::generate::{GenerationFuture, SummaryGenerator, TemplateGenerator};
use sumdag::model::Program;
use sumdag::types::FailureMode;
use sumdag_test_utils::builders::{GraphBuilder, diamond, scenario_a, scenario_cycle};
use sumdag_test_utils::fake_generator::{RecordingGenerator, Variant};
use sumdag_test_utils::{init_tracing, with_timeout};

type TestResult = Result<(), Box<dyn Error>>;

fn options() -> EngineOptions {
    EngineOptions::default()
}

#[tokio::test]
async fn scenario_a_summarizes_dependencies_first() -> TestResult {
    init_tracing();
    let generator = RecordingGenerator::new();

    let summaries = with_timeout(summarize(
        scenario_a().build_graph(),
        Arc::new(generator.clone()),
        options(),
    ))
    .await?;

    assert_eq!(summaries.len(), 3);
    assert_eq!(generator.started_order(), vec!["A", "B", "C"]);

    let (variant, deps) = generator.call_for("A").ok_or("A never generated")?;
    assert_eq!(variant, Variant::Leaf);
    assert!(deps.is_empty());

    let (variant, deps) = generator.call_for("C").ok_or("C never generated")?;
    assert_eq!(variant, Variant::WithDeps);
    assert_eq!(
        deps,
        vec![
            ("A".to_string(), summaries.get("A").cloned()),
            ("B".to_string(), summaries.get("B").cloned()),
        ]
    );
    assert_eq!(
        summaries.get("C").map(String::as_str),
        Some("summary(C)<-[summary(A),summary(B)<-[summary(A)]]")
    );
    Ok(())
}

#[tokio::test]
async fn diamond_generates_each_program_exactly_once() -> TestResult {
    init_tracing();
    let generator = RecordingGenerator::new()
        .with_delay(Duration::from_millis(5))
        .with_delay_for("C", Duration::from_millis(30));

    let summaries = with_timeout(summarize(
        diamond().build_graph(),
        Arc::new(generator.clone()),
        options(),
    ))
    .await?;

    assert_eq!(summaries.keys().collect::<Vec<_>>(), vec!["A", "B", "C", "D"]);
    for id in ["A", "B", "C", "D"] {
        assert_eq!(generator.calls_for(id), 1, "{id} generated more than once");
    }

    // D starts only after both B and C have finished.
    let d_started = generator.started_at("D").ok_or("D never started")?;
    for dep in ["B", "C"] {
        let finished = generator.finished_at(dep).ok_or("dependency never finished")?;
        assert!(finished < d_started, "{dep} finished after D started");
    }

    // B and C are independent and overlap.
    assert!(generator.peak_concurrency() >= 2);
    Ok(())
}

#[tokio::test]
async fn failure_stops_dependents_and_keeps_partial_results() -> TestResult {
    init_tracing();
    let graph = GraphBuilder::new()
        .program("Q")
        .program("S")
        .program_with_deps("P", &["Q"])
        .build_graph();
    let generator = RecordingGenerator::new()
        .failing_on("Q")
        .with_delay_for("S", Duration::from_millis(30));

    let summarizer = Summarizer::new(graph, Arc::new(generator.clone()), options());
    let store = summarizer.store();
    let result = with_timeout(summarizer.run()).await;

    match result {
        Err(SumdagError::Generation {
            program,
            source,
            unresolved,
        }) => {
            assert_eq!(program, "Q");
            assert!(matches!(source, GenerationError::Service(_)));
            assert_eq!(unresolved, vec!["P".to_string(), "Q".to_string()]);
        }
        other => panic!("expected Generation error, got {other:?}"),
    }

    assert_eq!(generator.calls_for("P"), 0);
    // S was already in flight and drained to completion.
    assert_eq!(store.ids()?, vec!["S".to_string()]);
    Ok(())
}

#[tokio::test]
async fn abort_mode_cancels_in_flight_siblings() -> TestResult {
    init_tracing();
    let graph = GraphBuilder::new().program("Q").program("SLOW").build_graph();
    let generator = RecordingGenerator::new()
        .failing_on("Q")
        .with_delay_for("SLOW", Duration::from_secs(60));

    let summarizer = Summarizer::new(
        graph,
        Arc::new(generator.clone()),
        EngineOptions {
            failure_mode: FailureMode::Abort,
            ..EngineOptions::default()
        },
    );
    let store = summarizer.store();
    let result = with_timeout(summarizer.run()).await;

    match result {
        Err(SumdagError::Generation { program, .. }) => assert_eq!(program, "Q"),
        other => panic!("expected Generation error, got {other:?}"),
    }
    assert!(store.is_empty()?);
    assert!(generator.finished_at("SLOW").is_none());
    Ok(())
}

#[tokio::test]
async fn cycle_fails_with_deadlock_instead_of_hanging() -> TestResult {
    init_tracing();
    let generator = RecordingGenerator::new();

    let result = with_timeout(summarize(
        scenario_cycle().build_graph(),
        Arc::new(generator.clone()),
        options(),
    ))
    .await;

    match result {
        Err(SumdagError::CycleOrDeadlock { stuck, cycles }) => {
            assert_eq!(stuck, vec!["X".to_string(), "Y".to_string()]);
            assert_eq!(cycles, vec![vec!["X".to_string(), "Y".to_string()]]);
        }
        other => panic!("expected CycleOrDeadlock, got {other:?}"),
    }
    assert!(generator.started_order().is_empty());
    Ok(())
}

#[tokio::test]
async fn acyclic_part_is_summarized_before_cycle_is_reported() -> TestResult {
    init_tracing();
    let graph = GraphBuilder::new()
        .program("A")
        .program_with_deps("X", &["Y"])
        .program_with_deps("Y", &["X"])
        .build_graph();
    let generator = RecordingGenerator::new();

    let summarizer = Summarizer::new(graph, Arc::new(generator.clone()), options());
    let store = summarizer.store();
    let result = with_timeout(summarizer.run()).await;

    assert!(matches!(result, Err(SumdagError::CycleOrDeadlock { .. })));
    assert_eq!(store.ids()?, vec!["A".to_string()]);
    Ok(())
}

#[tokio::test]
async fn dangling_relation_does_not_block_the_program() -> TestResult {
    init_tracing();
    let graph = GraphBuilder::new()
        .program("P")
        .relation("P", "CALLS", "MISSING")
        .build_graph();
    let generator = RecordingGenerator::new();

    let summaries = with_timeout(summarize(graph, Arc::new(generator.clone()), options())).await?;

    assert_eq!(summaries.get("P").map(String::as_str), Some("summary(P)"));
    let (variant, _) = generator.call_for("P").ok_or("P never generated")?;
    assert_eq!(variant, Variant::Leaf);
    Ok(())
}

#[tokio::test]
async fn max_in_flight_is_respected() -> TestResult {
    init_tracing();
    let mut builder = GraphBuilder::new();
    for i in 0..8 {
        builder = builder.program(&format!("L{i}"));
    }
    let generator = RecordingGenerator::new().with_delay(Duration::from_millis(10));

    let summaries = with_timeout(summarize(
        builder.build_graph(),
        Arc::new(generator.clone()),
        EngineOptions {
            max_in_flight: Some(3),
            ..EngineOptions::default()
        },
    ))
    .await?;

    assert_eq!(summaries.len(), 8);
    assert!(generator.peak_concurrency() <= 3);
    assert!(generator.peak_concurrency() >= 2);
    Ok(())
}

#[tokio::test]
async fn slow_generation_times_out() -> TestResult {
    init_tracing();
    let graph = GraphBuilder::new().program("SLOW").build_graph();
    let generator = RecordingGenerator::new().with_delay(Duration::from_secs(60));

    let result = with_timeout(summarize(
        graph,
        Arc::new(generator),
        EngineOptions {
            generation_timeout: Some(Duration::from_millis(20)),
            ..EngineOptions::default()
        },
    ))
    .await;

    match result {
        Err(SumdagError::Generation { program, source, .. }) => {
            assert_eq!(program, "SLOW");
            assert_eq!(source, GenerationError::Timeout(Duration::from_millis(20)));
        }
        other => panic!("expected Generation timeout, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn shutdown_request_interrupts_the_run() -> TestResult {
    init_tracing();
    let graph = GraphBuilder::new()
        .program("SLOW")
        .program_with_deps("NEXT", &["SLOW"])
        .build_graph();
    let generator = RecordingGenerator::new().with_delay(Duration::from_secs(60));

    let summarizer = Summarizer::new(graph, Arc::new(generator), options());
    let tx = summarizer.event_sender();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
    });

    match with_timeout(summarizer.run()).await {
        Err(SumdagError::Interrupted { unresolved }) => {
            assert_eq!(unresolved, vec!["NEXT".to_string(), "SLOW".to_string()]);
        }
        other => panic!("expected Interrupted, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn empty_graph_yields_empty_result() -> TestResult {
    init_tracing();
    let summaries = with_timeout(summarize(
        GraphBuilder::new().build_graph(),
        Arc::new(RecordingGenerator::new()),
        options(),
    ))
    .await?;

    assert!(summaries.is_empty());
    Ok(())
}

#[tokio::test]
async fn template_generator_renders_program_and_relations() -> TestResult {
    init_tracing();
    let summaries = with_timeout(summarize(
        scenario_a().build_graph(),
        Arc::new(TemplateGenerator::new(Duration::ZERO)),
        options(),
    ))
    .await?;

    assert_eq!(
        summaries.get("A").map(String::as_str),
        Some("This program (Z_A) is a PROG in the ZPKG package.")
    );
    assert_eq!(
        summaries.get("C").map(String::as_str),
        Some(
            "This program (Z_C) is a PROG in the ZPKG package.\n\n\
             It has the following relations:\n - Z_A (PROG)\n - Z_B (PROG)"
        )
    );
    Ok(())
}

/// Generator whose leaf call panics before producing a future.
struct PanickingGenerator;

impl SummaryGenerator for PanickingGenerator {
    fn generate_leaf<'a>(&'a self, program: &'a Program) -> GenerationFuture<'a> {
        panic!("generator exploded on {}", program.id)
    }

    fn generate_with_deps<'a>(
        &'a self,
        program: &'a Program,
        _dependencies: &'a [Program],
    ) -> GenerationFuture<'a> {
        Box::pin(async move { Ok::<_, GenerationError>(format!("summary({})", program.id)) })
    }
}

#[tokio::test]
async fn panicking_generator_fails_the_run_instead_of_hanging() -> TestResult {
    init_tracing();
    let summarizer = Summarizer::new(scenario_a().build_graph(), Arc::new(PanickingGenerator), options());
    let store = summarizer.store();

    match with_timeout(summarizer.run()).await {
        Err(SumdagError::Generation {
            program,
            source: GenerationError::Service(msg),
            unresolved,
        }) => {
            assert_eq!(program, "A");
            assert!(msg.contains("generator exploded on A"), "unexpected message: {msg}");
            assert_eq!(unresolved, vec!["A".to_string(), "B".to_string(), "C".to_string()]);
        }
        other => panic!("expected Generation error, got {other:?}"),
    }
    assert!(store.is_empty()?);
    Ok(())
}
