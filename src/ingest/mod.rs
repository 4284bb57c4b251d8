// src/ingest/mod.rs

//! CSV ingestion of program and relation exports.
//!
//! Exports from the source system often carry a UTF-8 byte-order mark and
//! quoted header names (`"\u{feff}"id""`), so headers are normalized before
//! records are deserialized.
//!
//! Program columns: `id, display_name, type, package_name` plus optional
//! `uri` and `source_code`. Relation columns: `abap_program_id,
//! relation_type, related_abap_program_id`.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::info;

use crate::errors::Result;
use crate::model::{Program, Relation};

/// One row of the programs export.
#[derive(Debug, Deserialize)]
struct ProgramRecord {
    id: String,
    display_name: String,
    #[serde(rename = "type")]
    kind: String,
    package_name: String,
    #[serde(default)]
    uri: String,
    #[serde(default)]
    source_code: String,
}

impl From<ProgramRecord> for Program {
    fn from(record: ProgramRecord) -> Self {
        let mut program = Program::new(record.id, record.display_name, record.kind, record.package_name);
        program.uri = record.uri;
        program.source_code = record.source_code;
        program
    }
}

pub fn load_programs(path: impl AsRef<Path>) -> Result<Vec<Program>> {
    let path = path.as_ref();
    let programs = read_programs(File::open(path)?)?;
    info!(path = ?path, count = programs.len(), "loaded programs");
    Ok(programs)
}

pub fn load_relations(path: impl AsRef<Path>) -> Result<Vec<Relation>> {
    let path = path.as_ref();
    let relations = read_relations(File::open(path)?)?;
    info!(path = ?path, count = relations.len(), "loaded relations");
    Ok(relations)
}

pub fn read_programs<R: Read>(reader: R) -> Result<Vec<Program>> {
    let records: Vec<ProgramRecord> = read_records(reader)?;
    Ok(records.into_iter().map(Program::from).collect())
}

pub fn read_relations<R: Read>(reader: R) -> Result<Vec<Relation>> {
    read_records(reader)
}

fn read_records<R: Read, T: DeserializeOwned>(reader: R) -> Result<Vec<T>> {
    let mut csv = ReaderBuilder::new().trim(Trim::All).from_reader(reader);

    let headers: StringRecord = csv.headers()?.iter().map(normalize_header).collect();
    csv.set_headers(headers);

    let mut records = Vec::new();
    for record in csv.deserialize() {
        records.push(record?);
    }
    Ok(records)
}

/// Strip a byte-order mark, surrounding quotes and whitespace from a header.
pub fn normalize_header(raw: &str) -> String {
    raw.trim_start_matches('\u{feff}')
        .trim()
        .trim_matches('"')
        .trim()
        .to_string()
}
