// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file and return the raw, unvalidated `RawConfigFile`.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;
    parse_str(&contents)
}

/// Parse TOML text into a `RawConfigFile`.
pub fn parse_str(contents: &str) -> Result<RawConfigFile> {
    let config: RawConfigFile = toml::from_str(contents)?;
    Ok(config)
}

/// Load a configuration file from path and validate it.
///
/// Relative `[input]` paths are resolved against the directory holding the
/// config file.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let path = path.as_ref();
    let raw_config = load_from_path(path)?;
    let mut config = ConfigFile::try_from(raw_config)?;

    let root = config_root_dir(path);
    config.input.programs = resolve_against(&root, &config.input.programs);
    config.input.relations = resolve_against(&root, &config.input.relations);
    debug!(
        programs = ?config.input.programs,
        relations = ?config.input.relations,
        "config loaded"
    );

    Ok(config)
}

/// Validated defaults, used when no config file is present.
pub fn default_config() -> Result<ConfigFile> {
    ConfigFile::try_from(RawConfigFile::default())
}

/// Default config location: `Sumdag.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("Sumdag.toml")
}

/// Directory relative input paths are resolved against.
///
/// A bare filename (empty parent) means the current directory.
fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn resolve_against(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
