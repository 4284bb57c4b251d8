// src/config/validate.rs

use crate::config::model::{ConfigFile, GeneratorSettings, RawConfigFile};
use crate::errors::{Result, SumdagError};
use crate::types::parse_duration;

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = SumdagError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_input(&raw)?;
        validate_scheduler(&raw)?;
        let generator = validate_generator(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.input, raw.scheduler, generator))
    }
}

fn validate_input(cfg: &RawConfigFile) -> Result<()> {
    if cfg.input.programs.as_os_str().is_empty() {
        return Err(SumdagError::ConfigError(
            "[input].programs must not be empty".to_string(),
        ));
    }
    if cfg.input.relations.as_os_str().is_empty() {
        return Err(SumdagError::ConfigError(
            "[input].relations must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_scheduler(cfg: &RawConfigFile) -> Result<()> {
    if cfg.scheduler.max_in_flight == Some(0) {
        return Err(SumdagError::ConfigError(
            "[scheduler].max_in_flight must be >= 1 (got 0); omit it for unbounded".to_string(),
        ));
    }
    Ok(())
}

fn validate_generator(cfg: &RawConfigFile) -> Result<GeneratorSettings> {
    let latency = parse_duration(&cfg.generator.latency)
        .map_err(|e| SumdagError::ConfigError(format!("[generator].latency: {e}")))?;

    let timeout = match cfg.generator.timeout.as_deref() {
        None => None,
        Some(raw) => {
            let timeout = parse_duration(raw)
                .map_err(|e| SumdagError::ConfigError(format!("[generator].timeout: {e}")))?;
            if timeout.is_zero() {
                return Err(SumdagError::ConfigError(
                    "[generator].timeout must be greater than zero".to_string(),
                ));
            }
            Some(timeout)
        }
    };

    Ok(GeneratorSettings { latency, timeout })
}
