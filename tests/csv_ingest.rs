// tests/csv_ingest.rs

use std::io::Write;

use sumdag::dag::DependencyGraph;
use sumdag::errors::SumdagError;
use sumdag::ingest::{load_programs, load_relations, normalize_header, read_programs, read_relations};
use tempfile::NamedTempFile;

type TestResult = Result<(), Box<dyn std::error::Error>>;

#[test]
fn program_headers_with_bom_and_quotes_are_normalized() -> TestResult {
    let data = "\u{feff}\"id\",\"display_name\",\"type\",\"package_name\",\"uri\",\"source_code\"\n\
                P1,ZREPORT_ONE,PROG,ZFIN,adt://p1,\"REPORT zreport_one.\"\n\
                P2, ZCL_TWO ,CLAS,ZFIN,,\n";

    let programs = read_programs(data.as_bytes())?;

    assert_eq!(programs.len(), 2);
    assert_eq!(programs[0].id, "P1");
    assert_eq!(programs[0].kind, "PROG");
    assert_eq!(programs[0].uri, "adt://p1");
    assert_eq!(programs[0].source_code, "REPORT zreport_one.");
    assert_eq!(programs[1].display_name, "ZCL_TWO");
    assert!(programs.iter().all(|p| p.summary.is_none()));
    Ok(())
}

#[test]
fn optional_program_columns_may_be_absent() -> TestResult {
    let data = "id,display_name,type,package_name\nP1,ZONE,PROG,ZPKG\n";

    let programs = read_programs(data.as_bytes())?;

    assert_eq!(programs[0].package_name, "ZPKG");
    assert!(programs[0].uri.is_empty());
    assert!(programs[0].source_code.is_empty());
    Ok(())
}

#[test]
fn missing_required_program_column_is_a_csv_error() {
    let data = "id,display_name\nP1,ZONE\n";

    match read_programs(data.as_bytes()) {
        Err(SumdagError::CsvError(_)) => {}
        other => panic!("Expected CsvError, got: {other:?}"),
    }
}

#[test]
fn relations_keep_every_row() -> TestResult {
    let data = "\u{feff}abap_program_id,relation_type,related_abap_program_id\n\
                B,CALLS,A\n\
                C,CALLS,A\n\
                C,INCLUDES,B\n";

    let relations = read_relations(data.as_bytes())?;

    assert_eq!(relations.len(), 3);
    assert_eq!(relations[0].source(), "B");
    assert_eq!(relations[0].target(), "A");
    assert_eq!(relations[2].relation_type, "INCLUDES");
    Ok(())
}

#[test]
fn files_load_into_a_graph() -> TestResult {
    let mut programs = NamedTempFile::new()?;
    write!(
        programs,
        "id,display_name,type,package_name\nA,ZA,PROG,Z\nB,ZB,PROG,Z\n"
    )?;
    let mut relations = NamedTempFile::new()?;
    write!(
        relations,
        "abap_program_id,relation_type,related_abap_program_id\nB,CALLS,A\nB,CALLS,GONE\n"
    )?;

    let graph = DependencyGraph::build(load_programs(programs.path())?, &load_relations(relations.path())?)?;

    assert_eq!(graph.len(), 2);
    assert_eq!(graph.edge_count(), 1);
    assert_eq!(graph.dropped_relations().len(), 1);
    Ok(())
}

#[test]
fn header_normalization() {
    assert_eq!(normalize_header("\u{feff}\"id\""), "id");
    assert_eq!(normalize_header("  type "), "type");
    assert_eq!(normalize_header("related_abap_program_id"), "related_abap_program_id");
}
