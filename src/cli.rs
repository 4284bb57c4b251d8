// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use crate::types::FailureMode;

/// Command-line arguments for `sumdag`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sumdag",
    version,
    about = "Summarize ABAP programs in dependency order.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sumdag.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Programs CSV export (overrides `[input].programs`).
    #[arg(long, value_name = "PATH")]
    pub programs: Option<PathBuf>,

    /// Relations CSV export (overrides `[input].relations`).
    #[arg(long, value_name = "PATH")]
    pub relations: Option<PathBuf>,

    /// Maximum concurrent generation calls (overrides `[scheduler]`).
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub max_in_flight: Option<u64>,

    /// What to do with running generations after a failure.
    #[arg(long, value_name = "MODE")]
    pub failure_mode: Option<FailureMode>,

    /// Simulated generation latency, e.g. `250ms` (overrides `[generator]`).
    #[arg(long, value_name = "DURATION")]
    pub latency: Option<String>,

    /// Per-call generation timeout, e.g. `30s` (overrides `[generator]`).
    #[arg(long, value_name = "DURATION")]
    pub timeout: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SUMDAG_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Load and build the graph, print the wave plan, generate nothing.
    #[arg(long)]
    pub dry_run: bool,

    /// Print results as JSON instead of plain text.
    #[arg(long)]
    pub json: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
