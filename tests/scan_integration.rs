//! Integration tests for scanning and catalog maintenance.
//!
//! These tests run the scanner against the Python fixture project in
//! testdata/project and exercise the create, update and check flows.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use envcatalog::catalog::{Catalog, DefaultValue, KeyOrder, Location};
use envcatalog::scan::{ScanOptions, Scanner};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

fn project_path() -> PathBuf {
    testdata_path().join("project")
}

fn scan(root: &Path, options: ScanOptions) -> envcatalog::ScanOutcome {
    Scanner::new(root)
        .expect("extractor should build")
        .with_options(options)
        .scan()
        .expect("scan should succeed")
}

fn keys(catalog: &Catalog) -> BTreeSet<String> {
    catalog.iter().map(|e| e.key()).collect()
}

#[test]
fn test_scan_fixture_project() {
    let outcome = scan(&project_path(), ScanOptions::default());

    let expected: BTreeSet<String> = [
        "BILLING_TIMEOUT_<non-constant>",
        "DATABASE_URL_None",
        "FEATURE_X_1",
        "LOG_LEVEL_INFO",
        "MIGRATION_DATABASE_URL_None",
        "PAGE_SIZE_None",
        "QUEUE_URL_None",
        "RETRIES_3",
        "STRIPE_KEY_None",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    assert_eq!(keys(&outcome.catalog), expected);
    assert_eq!(outcome.total_references, 10);
    assert_eq!(outcome.files_scanned, 5);
}

#[test]
fn test_both_call_shapes_share_one_entry() {
    let outcome = scan(&project_path(), ScanOptions::default());
    let entry = outcome.catalog.get("FEATURE_X_1").expect("FEATURE_X_1");

    assert_eq!(entry.default_value, Some(DefaultValue::Str("1".to_string())));
    assert_eq!(
        entry.locations,
        vec![
            Location::new("api/handlers/users.py", 5),
            Location::new("worker/tasks.py", 8),
        ]
    );
    assert_eq!(entry.tags.iter().collect::<Vec<_>>(), vec!["api", "worker"]);
    assert_eq!(entry.packages.iter().collect::<Vec<_>>(), vec!["handlers", "worker"]);
    assert_eq!(entry.inferred_type, "str");
}

#[test]
fn test_tags_packages_and_types() {
    let outcome = scan(&project_path(), ScanOptions::default());
    let catalog = &outcome.catalog;

    let stripe = catalog.get("STRIPE_KEY_None").unwrap();
    assert!(stripe.tags.contains("billing"));
    assert!(stripe.packages.contains("billing"));

    let log_level = catalog.get("LOG_LEVEL_INFO").unwrap();
    assert!(log_level.tags.contains(""));
    assert!(log_level.packages.contains("unknown_package"));

    assert_eq!(catalog.get("PAGE_SIZE_None").unwrap().inferred_type, "int");
    assert_eq!(catalog.get("RETRIES_3").unwrap().inferred_type, "int");
    assert_eq!(
        catalog.get("BILLING_TIMEOUT_<non-constant>").unwrap().inferred_type,
        "float"
    );
    assert_eq!(catalog.get("QUEUE_URL_None").unwrap().inferred_type, "");
}

#[test]
fn test_excluded_directories_and_patterns() {
    let outcome = scan(&project_path(), ScanOptions::default());
    assert!(outcome.catalog.iter().all(|e| e.name != "VENV_ONLY"));

    let options = ScanOptions {
        exclude_patterns: vec!["migrations/".to_string()],
        ..ScanOptions::default()
    };
    let outcome = scan(&project_path(), options);
    assert!(outcome.catalog.get("MIGRATION_DATABASE_URL_None").is_none());
    assert_eq!(outcome.catalog.len(), 8);
    assert_eq!(outcome.total_references, 9);
}

#[test]
fn test_scan_is_idempotent() {
    let first = scan(&project_path(), ScanOptions::default());
    let second = scan(&project_path(), ScanOptions::default());

    assert_eq!(first.catalog, second.catalog);
    assert_eq!(first.total_references, second.total_references);
}

#[test]
fn test_create_then_update_without_changes() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("env_var_catalog.json");

    let created = scan(&project_path(), ScanOptions::default()).catalog;
    created.save(&path, KeyOrder::Declared).unwrap();

    let mut existing = Catalog::load(&path).unwrap();
    assert_eq!(existing, created);

    let stats = existing.merge(scan(&project_path(), ScanOptions::default()).catalog);
    assert_eq!((stats.added, stats.updated), (0, 0));
    assert_eq!(existing, created);
}

#[test]
fn test_update_accumulates_new_call_sites() {
    let project = TempDir::new().unwrap();
    let module = project.path().join("api").join("app.py");
    fs::create_dir_all(module.parent().unwrap()).unwrap();
    fs::write(&module, "import os\nHOST = os.getenv('HOST', 'localhost')\n").unwrap();

    let mut catalog = scan(project.path(), ScanOptions::default()).catalog;

    fs::write(
        &module,
        "import os\n\nHOST = os.getenv('HOST', 'localhost')\nHOST_AGAIN = os.getenv('HOST', 'localhost')\nPORT = os.getenv('PORT')\n",
    )
    .unwrap();
    let stats = catalog.merge(scan(project.path(), ScanOptions::default()).catalog);

    assert_eq!(stats.added, 1);
    assert_eq!(stats.updated, 2);

    // the stale line-2 location is kept; nothing is ever removed
    let host = catalog.get("HOST_localhost").unwrap();
    assert_eq!(
        host.locations,
        vec![
            Location::new("api/app.py", 2),
            Location::new("api/app.py", 3),
            Location::new("api/app.py", 4),
        ]
    );
}

#[test]
fn test_check_finds_undocumented_variables() {
    let documented = Catalog::load(testdata_path().join("catalog.json")).unwrap();
    let scanned = scan(&project_path(), ScanOptions::default()).catalog;

    let missing: Vec<&str> = documented
        .undocumented(&scanned)
        .into_iter()
        .map(|e| e.name.as_str())
        .collect();

    assert_eq!(
        missing,
        vec![
            "FEATURE_X",
            "PAGE_SIZE",
            "MIGRATION_DATABASE_URL",
            "STRIPE_KEY",
            "BILLING_TIMEOUT",
            "RETRIES",
        ]
    );
}

#[test]
fn test_syntax_error_aborts_whole_scan() {
    let project = TempDir::new().unwrap();
    fs::write(project.path().join("good.py"), "import os\nos.getenv('A')\n").unwrap();
    fs::write(project.path().join("bad.py"), "import os\nos.getenv('B'\n").unwrap();

    let result = Scanner::new(project.path()).unwrap().scan();
    assert!(result.is_err());
}
