// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::engine::EngineOptions;
use crate::types::FailureMode;

/// Raw configuration as read from a TOML file, before validation.
///
/// ```toml
/// [input]
/// programs = "abap_programs.csv"
/// relations = "abap_program_relations.csv"
///
/// [scheduler]
/// max_in_flight = 8
/// failure_mode = "drain"
///
/// [generator]
/// latency = "1s"
/// timeout = "30s"
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfigFile {
    #[serde(default)]
    pub input: InputSection,

    #[serde(default)]
    pub scheduler: SchedulerSection,

    #[serde(default)]
    pub generator: RawGeneratorSection,
}

/// `[input]` section: where the program and relation exports live.
#[derive(Debug, Clone, Deserialize)]
pub struct InputSection {
    #[serde(default = "default_programs_path")]
    pub programs: PathBuf,

    #[serde(default = "default_relations_path")]
    pub relations: PathBuf,
}

fn default_programs_path() -> PathBuf {
    PathBuf::from("abap_programs.csv")
}

fn default_relations_path() -> PathBuf {
    PathBuf::from("abap_program_relations.csv")
}

impl Default for InputSection {
    fn default() -> Self {
        Self {
            programs: default_programs_path(),
            relations: default_relations_path(),
        }
    }
}

/// `[scheduler]` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SchedulerSection {
    /// Maximum number of concurrent generation calls; unbounded if omitted.
    #[serde(default)]
    pub max_in_flight: Option<usize>,

    /// `"drain"` (default) or `"abort"`.
    #[serde(default)]
    pub failure_mode: FailureMode,
}

/// `[generator]` section as written in the file (durations as strings).
#[derive(Debug, Clone, Deserialize)]
pub struct RawGeneratorSection {
    /// Simulated service latency per call, e.g. `"1s"`.
    #[serde(default = "default_latency")]
    pub latency: String,

    /// Optional per-call timeout, e.g. `"30s"`.
    #[serde(default)]
    pub timeout: Option<String>,
}

fn default_latency() -> String {
    "1s".to_string()
}

impl Default for RawGeneratorSection {
    fn default() -> Self {
        Self {
            latency: default_latency(),
            timeout: None,
        }
    }
}

/// `[generator]` section after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorSettings {
    pub latency: Duration,
    pub timeout: Option<Duration>,
}

/// Validated configuration.
///
/// Only constructed through `TryFrom<RawConfigFile>` (see `validate.rs`).
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub input: InputSection,
    pub scheduler: SchedulerSection,
    pub generator: GeneratorSettings,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        input: InputSection,
        scheduler: SchedulerSection,
        generator: GeneratorSettings,
    ) -> Self {
        Self {
            input,
            scheduler,
            generator,
        }
    }

    /// Engine options derived from `[scheduler]` and `[generator]`.
    pub fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            max_in_flight: self.scheduler.max_in_flight,
            failure_mode: self.scheduler.failure_mode,
            generation_timeout: self.generator.timeout,
        }
    }
}
