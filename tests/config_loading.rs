// tests/config_loading.rs

use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;

use sumdag::config::{default_config, load_and_validate, parse_str, ConfigFile};
use sumdag::errors::SumdagError;
use sumdag::types::{FailureMode, parse_duration};
use tempfile::NamedTempFile;

fn validate(toml: &str) -> Result<ConfigFile, SumdagError> {
    ConfigFile::try_from(parse_str(toml)?)
}

fn expect_config_error(toml: &str, needle: &str) {
    match validate(toml) {
        Err(SumdagError::ConfigError(msg)) => {
            assert!(msg.contains(needle), "message {msg:?} should mention {needle:?}")
        }
        Err(e) => panic!("Expected ConfigError, got: {e:?}"),
        Ok(cfg) => panic!("Expected error, got Ok({cfg:?})"),
    }
}

#[test]
fn defaults_apply_when_sections_are_missing() {
    let cfg = default_config().unwrap();

    assert_eq!(cfg.input.programs, PathBuf::from("abap_programs.csv"));
    assert_eq!(cfg.input.relations, PathBuf::from("abap_program_relations.csv"));
    assert_eq!(cfg.scheduler.max_in_flight, None);
    assert_eq!(cfg.scheduler.failure_mode, FailureMode::Drain);
    assert_eq!(cfg.generator.latency, Duration::from_secs(1));
    assert_eq!(cfg.generator.timeout, None);

    let from_empty = validate("").unwrap();
    assert_eq!(from_empty.generator, cfg.generator);
}

#[test]
fn full_config_is_parsed_into_engine_options() {
    let cfg = validate(
        r#"
[input]
programs = "p.csv"
relations = "r.csv"

[scheduler]
max_in_flight = 4
failure_mode = "abort"

[generator]
latency = "250ms"
timeout = "2m"
"#,
    )
    .unwrap();

    assert_eq!(cfg.generator.latency, Duration::from_millis(250));

    let options = cfg.engine_options();
    assert_eq!(options.max_in_flight, Some(4));
    assert_eq!(options.failure_mode, FailureMode::Abort);
    assert_eq!(options.generation_timeout, Some(Duration::from_secs(120)));
}

#[test]
fn zero_max_in_flight_is_rejected() {
    expect_config_error("[scheduler]\nmax_in_flight = 0\n", "max_in_flight");
}

#[test]
fn zero_timeout_is_rejected() {
    expect_config_error("[generator]\ntimeout = \"0s\"\n", "timeout");
}

#[test]
fn malformed_latency_is_rejected() {
    expect_config_error("[generator]\nlatency = \"soon\"\n", "latency");
}

#[test]
fn empty_input_path_is_rejected() {
    expect_config_error("[input]\nprograms = \"\"\n", "programs");
}

#[test]
fn unknown_failure_mode_is_a_toml_error() {
    match validate("[scheduler]\nfailure_mode = \"panic\"\n") {
        Err(SumdagError::TomlError(_)) => {}
        other => panic!("Expected TomlError, got: {other:?}"),
    }
}

#[test]
fn relative_input_paths_resolve_against_config_dir() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("Sumdag.toml");
    std::fs::write(
        &path,
        "[input]\nprograms = \"data/programs.csv\"\nrelations = \"/abs/relations.csv\"\n",
    )
    .unwrap();

    let cfg = load_and_validate(&path).unwrap();

    assert_eq!(cfg.input.programs, dir.path().join("data/programs.csv"));
    assert_eq!(cfg.input.relations, PathBuf::from("/abs/relations.csv"));
}

#[test]
fn load_and_validate_reads_from_disk() {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "[scheduler]\nmax_in_flight = 2\n").unwrap();

    let cfg = load_and_validate(file.path()).unwrap();
    assert_eq!(cfg.scheduler.max_in_flight, Some(2));
}

#[test]
fn missing_config_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    match load_and_validate(dir.path().join("absent.toml")) {
        Err(SumdagError::IoError(_)) => {}
        other => panic!("Expected IoError, got: {other:?}"),
    }
}

#[test]
fn parse_duration_units() {
    assert_eq!(parse_duration("15ms").unwrap(), Duration::from_millis(15));
    assert_eq!(parse_duration(" 3s ").unwrap(), Duration::from_secs(3));
    assert_eq!(parse_duration("2m").unwrap(), Duration::from_secs(120));
    assert_eq!(parse_duration("1h").unwrap(), Duration::from_secs(3600));

    assert!(parse_duration("10").is_err());
    assert!(parse_duration("s").is_err());
    assert!(parse_duration("5d").is_err());
}

#[test]
fn failure_mode_from_str() {
    assert_eq!("Drain".parse::<FailureMode>().unwrap(), FailureMode::Drain);
    assert_eq!(" abort ".parse::<FailureMode>().unwrap(), FailureMode::Abort);
    assert!("stop".parse::<FailureMode>().is_err());
}
