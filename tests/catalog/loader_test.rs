//! Integration tests for loading schema catalogs from disk.

use std::fs;
use std::path::{Path, PathBuf};

use nlquery::catalog::{load_catalog, load_table, DataType, SchemaError};
use tempfile::TempDir;

fn manifest_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
}

fn write_schema(dir: &TempDir, name: &str, content: &str) {
    fs::write(dir.path().join(name), content).unwrap();
}

// ============================================================================
// Bundled catalogs
// ============================================================================

#[test]
fn test_load_bundled_update_catalog() {
    let table = load_table(&manifest_dir(), "schema/update.toml", "update").unwrap();

    assert_eq!(table.name, "update");
    assert_eq!(table.primary_key(), Some("id"));
    assert!(table.has_column("provider"));
    assert!(table.has_column("product_name"));
    assert_eq!(
        table.column("published_date").unwrap().data_type,
        DataType::DateTime
    );
    assert_eq!(
        table.column("provider").unwrap().examples,
        vec!["aws", "azure"]
    );
}

#[test]
fn test_load_json_fixture_picks_named_table() {
    let table = load_table(&manifest_dir(), "tests/fixtures/update.json", "update").unwrap();

    assert_eq!(table.columns.len(), 5);
    assert_eq!(table.column("id").unwrap().data_type, DataType::Integer);
    assert_eq!(table.column("provider").unwrap().data_type, DataType::Text);
    assert_eq!(
        table.column("product_name").unwrap().example_matching("azure functions"),
        Some("Azure Functions")
    );
}

#[test]
fn test_absolute_locator_ignores_root() {
    let absolute = manifest_dir().join("schema/update.toml");
    let table = load_table(
        Path::new("/nonexistent/root"),
        absolute.to_str().unwrap(),
        "update",
    )
    .unwrap();
    assert_eq!(table.name, "update");
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_missing_file() {
    let dir = TempDir::new().unwrap();
    let err = load_catalog(dir.path(), "absent.toml").unwrap_err();
    assert!(matches!(err, SchemaError::FileNotFound { .. }));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    write_schema(&dir, "schema.yaml", "tables: []");

    let err = load_catalog(dir.path(), "schema.yaml").unwrap_err();
    assert!(matches!(
        err,
        SchemaError::UnsupportedExtension { extension } if extension == "yaml"
    ));
}

#[test]
fn test_malformed_document() {
    let dir = TempDir::new().unwrap();
    write_schema(&dir, "schema.json", r#"{"tables": [{"name": "update""#);

    let err = load_catalog(dir.path(), "schema.json").unwrap_err();
    assert!(matches!(err, SchemaError::Parse { path, .. } if path.ends_with("schema.json")));
}

#[test]
fn test_document_without_tables() {
    let dir = TempDir::new().unwrap();
    write_schema(&dir, "schema.toml", "");

    let err = load_table(dir.path(), "schema.toml", "update").unwrap_err();
    assert!(matches!(err, SchemaError::NoTables));
}

#[test]
fn test_table_not_found() {
    let err = load_table(&manifest_dir(), "schema/update.toml", "release").unwrap_err();
    assert!(matches!(err, SchemaError::TableNotFound(name) if name == "release"));
}

#[test]
fn test_invalid_tables_are_rejected() {
    let dir = TempDir::new().unwrap();
    write_schema(
        &dir,
        "dupes.toml",
        r#"
            [[tables]]
            name = "update"

            [[tables.columns]]
            name = "id"
            data_type = "INTEGER"

            [[tables.columns]]
            name = "id"
            data_type = "TEXT"
        "#,
    );
    write_schema(
        &dir,
        "empty.toml",
        r#"
            [[tables]]
            name = "update"
        "#,
    );

    let err = load_table(dir.path(), "dupes.toml", "update").unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateColumn { column, .. } if column == "id"));

    let err = load_table(dir.path(), "empty.toml", "update").unwrap_err();
    assert!(matches!(err, SchemaError::EmptyTable(name) if name == "update"));
}
