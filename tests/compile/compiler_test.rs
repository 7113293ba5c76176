//! Integration tests for question → SQL compilation.
//!
//! SQL text is pinned with inline snapshots; every statement is also
//! re-parsed with sqlparser for its dialect.

use std::path::PathBuf;
use std::sync::Arc;

use nlquery::catalog::{load_table, Table};
use nlquery::compile::{CompileError, CompileOptions, CompiledSql, SqlCompiler, SqlValue};
use nlquery::intent::{
    Aggregation, Filter, FilterOperator, IntentParser, OrderBy, ParsedQuery, ParserOptions,
};
use nlquery::sql::Dialect;
use sqlparser::parser::Parser;

fn update_table() -> Arc<Table> {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Arc::new(load_table(&root, "schema/update.toml", "update").unwrap())
}

fn compile_question(question: &str, dialect: Dialect) -> CompiledSql {
    let table = update_table();
    let parsed = IntentParser::with_gazetteer(Arc::clone(&table), ParserOptions::default())
        .parse(question)
        .unwrap();
    let compiled = SqlCompiler::new(table, CompileOptions::default().with_dialect(dialect))
        .compile(&parsed)
        .unwrap();
    assert_parses(&compiled);
    compiled
}

fn assert_parses(compiled: &CompiledSql) {
    let statements = Parser::parse_sql(
        compiled.dialect.parser_dialect().as_ref(),
        &compiled.statement,
    )
    .unwrap_or_else(|e| panic!("{}: {e}\n{}", compiled.dialect, compiled.statement));
    assert_eq!(statements.len(), 1);
}

fn texts(values: &[&str]) -> Vec<SqlValue> {
    values.iter().map(|v| SqlValue::from(*v)).collect()
}

// ============================================================================
// Questions end to end (SQLite)
// ============================================================================

#[test]
fn test_count_question() {
    let compiled = compile_question("how many azure updates", Dialect::Sqlite);

    insta::assert_snapshot!(compiled.statement, @r#"SELECT COUNT("id") AS "total_count" FROM "update" WHERE "provider" = ?;"#);
    assert_eq!(compiled.parameters, texts(&["azure"]));
}

#[test]
fn test_top_n_question() {
    let compiled = compile_question(
        "which are the top 3 AWS services mentioned in the updates",
        Dialect::Sqlite,
    );

    insta::assert_snapshot!(compiled.statement, @r#"SELECT "product_name", COUNT("id") AS "mention_count" FROM "update" WHERE "provider" = ? GROUP BY "product_name" ORDER BY mention_count DESC LIMIT ?;"#);
    assert_eq!(
        compiled.parameters,
        vec![SqlValue::from("aws"), SqlValue::Integer(3)]
    );
}

#[test]
fn test_service_with_the_most_updates_question() {
    let compiled = compile_question(
        "which is the AWS service with the most updates",
        Dialect::Sqlite,
    );

    insta::assert_snapshot!(compiled.statement, @r#"SELECT "product_name", COUNT("id") AS "update_count" FROM "update" WHERE "provider" = ? GROUP BY "product_name" ORDER BY update_count DESC LIMIT ?;"#);
    assert_eq!(
        compiled.parameters,
        vec![SqlValue::from("aws"), SqlValue::Integer(1)]
    );
}

#[test]
fn test_find_data_question() {
    let compiled = compile_question("show me updates for EC2", Dialect::Sqlite);

    insta::assert_snapshot!(compiled.statement, @r#"SELECT "title", "provider", "product_name", "published_date" FROM "update" WHERE "product_name" = ?;"#);
    assert_eq!(compiled.parameters, texts(&["EC2"]));
}

#[test]
fn test_question_without_filters() {
    let compiled = compile_question("which products got the most updates", Dialect::Sqlite);

    insta::assert_snapshot!(compiled.statement, @r#"SELECT "product_name", COUNT("id") AS "update_count" FROM "update" GROUP BY "product_name" ORDER BY update_count DESC LIMIT ?;"#);
    assert_eq!(compiled.parameters, vec![SqlValue::Integer(5)]);
}

// ============================================================================
// Dialects
// ============================================================================

#[test]
fn test_top_n_question_postgres() {
    let compiled = compile_question(
        "which are the top 3 AWS services mentioned in the updates",
        Dialect::Postgres,
    );

    insta::assert_snapshot!(compiled.statement, @r#"SELECT "product_name", COUNT("id") AS "mention_count" FROM "update" WHERE "provider" = $1 GROUP BY "product_name" ORDER BY mention_count DESC LIMIT $2;"#);
}

#[test]
fn test_count_question_mysql() {
    let compiled = compile_question("how many azure updates", Dialect::MySql);

    insta::assert_snapshot!(compiled.statement, @"SELECT COUNT(`id`) AS `total_count` FROM `update` WHERE `provider` = ?;");
}

#[test]
fn test_count_question_duckdb() {
    let compiled = compile_question("how many azure updates", Dialect::DuckDb);

    insta::assert_snapshot!(compiled.statement, @r#"SELECT COUNT("id") AS "total_count" FROM "update" WHERE "provider" = ?;"#);
}

// ============================================================================
// Hand-built queries
// ============================================================================

#[test]
fn test_mixed_operators_bind_in_textual_order() {
    let query = ParsedQuery {
        select_columns: vec!["title".into(), "url".into()],
        filters: vec![
            Filter::equals("provider", "aws"),
            Filter::new("title", FilterOperator::Like, "preview"),
            Filter::new("published_date", FilterOperator::GreaterThan, "2024-01-01"),
            Filter::new("published_date", FilterOperator::LessThan, "2024-07-01"),
        ],
        order_by: Some(OrderBy::desc("published_date")),
        limit: Some(20),
        target_table: "update".into(),
        ..Default::default()
    };

    let compiled = SqlCompiler::new(update_table(), CompileOptions::default())
        .compile(&query)
        .unwrap();
    assert_parses(&compiled);

    insta::assert_snapshot!(compiled.statement, @r#"SELECT "title", "url" FROM "update" WHERE "provider" = ? AND "title" LIKE ? AND "published_date" > ? AND "published_date" < ? ORDER BY "published_date" DESC LIMIT ?;"#);
    assert_eq!(
        compiled.parameters,
        vec![
            SqlValue::from("aws"),
            SqlValue::from("%preview%"),
            SqlValue::from("2024-01-01"),
            SqlValue::from("2024-07-01"),
            SqlValue::Integer(20),
        ]
    );
}

#[test]
fn test_unknown_operator_strict_and_lax() {
    let query = ParsedQuery {
        filters: vec![Filter::new(
            "provider",
            FilterOperator::Other("SOUNDS_LIKE".into()),
            "aws",
        )],
        aggregations: vec![Aggregation::count("*", "n")],
        target_table: "update".into(),
        ..Default::default()
    };

    let lax = SqlCompiler::new(update_table(), CompileOptions::default())
        .compile(&query)
        .unwrap();
    insta::assert_snapshot!(lax.statement, @r#"SELECT COUNT(*) AS "n" FROM "update" WHERE "provider" = ?;"#);

    let err = SqlCompiler::new(update_table(), CompileOptions::default().strict())
        .compile(&query)
        .unwrap_err();
    assert!(matches!(
        err,
        CompileError::UnsupportedOperator { operator, column }
            if operator == "SOUNDS_LIKE" && column == "provider"
    ));
}

#[test]
fn test_parsed_query_from_json() {
    let json = r#"{
        "intent": "find_most_frequent",
        "select_columns": ["provider"],
        "aggregations": [{"type": "COUNT", "column": "id", "alias": "n"}],
        "group_by_column": "provider",
        "order_by": {"column": "n", "direction": "DESC"},
        "limit": 2,
        "target_table": "update"
    }"#;
    let query: ParsedQuery = serde_json::from_str(json).unwrap();

    let compiled = SqlCompiler::new(update_table(), CompileOptions::default())
        .compile(&query)
        .unwrap();

    insta::assert_snapshot!(compiled.statement, @r#"SELECT "provider", COUNT("id") AS "n" FROM "update" GROUP BY "provider" ORDER BY n DESC LIMIT ?;"#);
    assert_eq!(
        serde_json::to_string(&compiled).unwrap(),
        r#"{"statement":"SELECT \"provider\", COUNT(\"id\") AS \"n\" FROM \"update\" GROUP BY \"provider\" ORDER BY n DESC LIMIT ?;","parameters":[2]}"#
    );
}

#[test]
fn test_wrong_table_is_rejected() {
    let query = ParsedQuery {
        target_table: "release".into(),
        ..Default::default()
    };
    let err = SqlCompiler::new(update_table(), CompileOptions::default())
        .compile(&query)
        .unwrap_err();
    assert!(matches!(err, CompileError::UnknownTable(name) if name == "release"));
}
