// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod generate;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod store;
pub mod types;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::CliArgs;
use crate::config::ConfigFile;
use crate::dag::{DependencyGraph, wavefronts};
use crate::engine::{RuntimeEvent, Summarizer};
use crate::errors::SumdagError;
use crate::generate::TemplateGenerator;
use crate::model::Summaries;
use crate::types::parse_duration;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (file + CLI overrides)
/// - CSV ingestion and graph construction
/// - the summarizer with the template generator
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = resolve_config(&args)?;

    let programs = ingest::load_programs(&cfg.input.programs)
        .with_context(|| format!("loading programs from {:?}", cfg.input.programs))?;
    let relations = ingest::load_relations(&cfg.input.relations)
        .with_context(|| format!("loading relations from {:?}", cfg.input.relations))?;

    let graph = DependencyGraph::build(programs, &relations)?;
    info!(
        programs = graph.len(),
        edges = graph.edge_count(),
        dropped = graph.dropped_relations().len(),
        "dependency graph ready"
    );

    if args.dry_run {
        print_dry_run(&graph, &cfg);
        return Ok(());
    }

    let generator = Arc::new(TemplateGenerator::new(cfg.generator.latency));
    let summarizer = Summarizer::new(graph, generator, cfg.engine_options());
    let store = summarizer.store();

    // Ctrl-C -> graceful shutdown.
    {
        let tx = summarizer.event_sender();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    let programs: Vec<model::Program> = summarizer.graph().programs().cloned().collect();

    match summarizer.run().await {
        Ok(summaries) => {
            print_summaries(&programs, &summaries, args.json)?;
            Ok(())
        }
        Err(err) => {
            report_failure(&err, store.len().unwrap_or(0));
            Err(err.into())
        }
    }
}

/// Load the config file (explicit, or `Sumdag.toml` if present, or
/// defaults) and apply CLI overrides.
fn resolve_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = match &args.config {
        Some(path) => config::load_and_validate(path)
            .with_context(|| format!("loading config {:?}", path))?,
        None => {
            let default_path = config::default_config_path();
            if default_path.is_file() {
                config::load_and_validate(&default_path)?
            } else {
                config::default_config()?
            }
        }
    };

    if let Some(path) = &args.programs {
        cfg.input.programs = path.clone();
    }
    if let Some(path) = &args.relations {
        cfg.input.relations = path.clone();
    }
    if let Some(n) = args.max_in_flight {
        cfg.scheduler.max_in_flight = Some(usize::try_from(n)?);
    }
    if let Some(mode) = args.failure_mode {
        cfg.scheduler.failure_mode = mode;
    }
    if let Some(latency) = &args.latency {
        cfg.generator.latency = parse_duration(latency)
            .map_err(|e| SumdagError::ConfigError(format!("--latency: {e}")))?;
    }
    if let Some(timeout) = &args.timeout {
        let timeout = parse_duration(timeout)
            .map_err(|e| SumdagError::ConfigError(format!("--timeout: {e}")))?;
        if timeout.is_zero() {
            return Err(SumdagError::ConfigError("--timeout must be greater than zero".into()).into());
        }
        cfg.generator.timeout = Some(timeout);
    }

    Ok(cfg)
}

fn print_summaries(programs: &[model::Program], summaries: &Summaries, json: bool) -> Result<()> {
    if json {
        let finished: Vec<model::Program> = programs
            .iter()
            .filter_map(|p| summaries.get(&p.id).map(|s| p.with_summary(s.clone())))
            .collect();
        println!("{}", serde_json::to_string_pretty(&finished)?);
        return Ok(());
    }

    for program in programs {
        if let Some(summary) = summaries.get(&program.id) {
            println!("== {} ({})", program.id, program.display_name);
            println!("{}", summary.trim());
            println!();
        }
    }
    Ok(())
}

fn report_failure(err: &SumdagError, kept: usize) {
    let unresolved = err.unresolved();
    warn!(
        kept,
        unresolved = unresolved.len(),
        "run failed; summaries generated before the failure were kept"
    );
    if let SumdagError::CycleOrDeadlock { cycles, .. } = err {
        for cycle in cycles {
            eprintln!("dependency cycle: {}", cycle.join(" -> "));
        }
    }
}

/// Dry-run output: graph stats, dropped relations and the wave plan.
fn print_dry_run(graph: &DependencyGraph, cfg: &ConfigFile) {
    println!("sumdag dry-run");
    println!("  scheduler.max_in_flight = {:?}", cfg.scheduler.max_in_flight);
    println!("  scheduler.failure_mode = {:?}", cfg.scheduler.failure_mode);
    println!("  generator.latency = {:?}", cfg.generator.latency);
    println!("  generator.timeout = {:?}", cfg.generator.timeout);
    println!();
    println!("programs: {}", graph.len());
    println!("dependency edges: {}", graph.edge_count());

    let dropped = graph.dropped_relations();
    if !dropped.is_empty() {
        println!("dropped relations ({}):", dropped.len());
        for unknown in dropped {
            println!("  - {unknown}");
        }
    }
    println!();

    match wavefronts(graph) {
        Ok(waves) => {
            println!("waves ({}):", waves.len());
            for (i, wave) in waves.iter().enumerate() {
                println!("  {i}: {}", wave.join(", "));
            }
        }
        Err(SumdagError::CycleOrDeadlock { stuck, cycles }) => {
            println!("graph cannot be fully scheduled; stuck: {}", stuck.join(", "));
            for cycle in cycles {
                println!("  cycle: {}", cycle.join(" -> "));
            }
        }
        Err(e) => println!("planning failed: {e}"),
    }
}
