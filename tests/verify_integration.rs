//! Integration tests for verification, gating and presence tagging.
//!
//! The catalog and task definition fixtures live in testdata/.

use std::path::PathBuf;

use envcatalog::catalog::{Catalog, KeyOrder, ALL_TAG};
use envcatalog::env::TaskDefinition;
use envcatalog::verify::{self, must_pass_check, EnvironmentVariableError, Status};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn load_catalog() -> Catalog {
    Catalog::load(testdata_path().join("catalog.json")).expect("should load catalog")
}

fn load_definition() -> TaskDefinition {
    TaskDefinition::from_file(testdata_path().join("task_definition.json"))
        .expect("should load task definition")
}

fn nothing_set(_: &str) -> bool {
    false
}

#[test]
fn test_port_with_default_warns_or_errors() {
    let catalog = load_catalog();
    let port: Vec<_> = catalog
        .iter()
        .filter(|e| e.name == "PORT")
        .cloned()
        .collect();
    assert_eq!(port.len(), 1);

    let report = verify::verify(&port, false, &nothing_set);
    let summary = report.summary();
    assert_eq!((summary.warnings, summary.errors), (1, 0));
    assert!(report.passed());

    let report = verify::verify(&port, true, &nothing_set);
    let summary = report.summary();
    assert_eq!((summary.warnings, summary.errors), (0, 1));
    assert!(!report.passed());
}

#[test]
fn test_verify_api_against_task_definition() {
    let catalog = load_catalog();
    let definition = load_definition();

    let api = catalog.filter_by_tag(&["api"]);
    let names: Vec<&str> = api.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["DATABASE_URL", "PORT", "LOG_LEVEL"]);

    let report = verify::verify(api.entries(), false, &definition);
    let statuses: Vec<Status> = report.checks.iter().map(|c| c.status).collect();
    assert_eq!(statuses, vec![Status::Present, Status::Warning, Status::Present]);
    assert!(report.passed());
}

#[test]
fn test_verify_worker_fails() {
    let catalog = load_catalog();
    let worker = catalog.filter_by_tag(&["worker"]);

    let report = verify::verify(worker.entries(), false, &load_definition());
    assert_eq!(report.summary().errors, 1);
    assert!(!report.passed());
}

#[test]
fn test_gate_raises_on_first_missing_variable() {
    let catalog = load_catalog();

    let err = must_pass_check(catalog.entries(), false, &nothing_set).unwrap_err();
    assert_eq!(
        err,
        EnvironmentVariableError::RequiredVariableMissing {
            name: "DATABASE_URL".to_string()
        }
    );
    assert_eq!(
        err.to_string(),
        "Required environment variable 'DATABASE_URL' is missing"
    );
}

#[test]
fn test_gate_passes_with_warnings() {
    let catalog = load_catalog();
    let api = catalog.filter_by_tag(&["api"]);

    assert_eq!(must_pass_check(api.entries(), false, &load_definition()), Ok(true));
    assert!(matches!(
        must_pass_check(api.entries(), true, &load_definition()),
        Err(EnvironmentVariableError::DefaultUsedAsError { name, .. }) if name == "PORT"
    ));
}

#[test]
fn test_tags_from_definition_round_trip() {
    let mut catalog = load_catalog();
    let definition = load_definition();

    assert_eq!(catalog.tag_present(&["api-service"], &definition), 2);
    assert_eq!(catalog.tag_present(&["api-service"], &definition), 0);

    let temp = TempDir::new().unwrap();
    let path = temp.path().join("tagged.json");
    catalog.save(&path, KeyOrder::Sorted).unwrap();

    let reloaded = Catalog::load(&path).unwrap();
    assert_eq!(reloaded, catalog);

    let selected = reloaded.filter_by_tag(&["api-service"]);
    let tagged: Vec<&str> = selected
        .iter()
        .filter(|e| !e.tags.contains(ALL_TAG))
        .map(|e| e.name.as_str())
        .collect();
    assert_eq!(tagged, vec!["DATABASE_URL"]);
}
