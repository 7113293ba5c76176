//! Properties that hold for every question: determinism, filter uniqueness,
//! and parameter binding across dialects.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;

use nlquery::catalog::{load_table, Table};
use nlquery::compile::{CompileOptions, SqlCompiler, SqlValue};
use nlquery::intent::{Filter, FilterOperator, IntentParser, ParsedQuery, ParserOptions};
use nlquery::sql::Dialect;
use sqlparser::parser::Parser;

const QUESTIONS: &[&str] = &[
    "which are the top 3 AWS services mentioned in the updates",
    "how many azure updates",
    "which is the AWS service with the most updates",
    "show me updates for EC2",
    "count the top 10 products",
    "which products got the most updates",
    "azure or the aws service with the most updates",
    "AWS aws Aws EC2 ec2 updates",
    "what changed in Azure Functions and Blob Storage",
    "top three services",
    "",
    "?!",
];

fn update_table() -> Arc<Table> {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    Arc::new(load_table(&root, "schema/update.toml", "update").unwrap())
}

fn parser() -> IntentParser {
    IntentParser::with_gazetteer(update_table(), ParserOptions::default())
}

/// Number of placeholders in `statement`, checking `$n` numbering where used.
fn count_placeholders(statement: &str, dialect: Dialect) -> usize {
    match dialect {
        Dialect::Postgres => {
            let mut n = 0;
            while statement.contains(&format!("${}", n + 1)) {
                n += 1;
            }
            assert!(
                !statement.contains('?'),
                "postgres statement uses '?': {statement}"
            );
            n
        }
        _ => statement.matches('?').count(),
    }
}

#[test]
fn test_parsing_is_deterministic() {
    let parser = parser();
    for question in QUESTIONS {
        assert_eq!(
            parser.parse(question).unwrap(),
            parser.parse(question).unwrap(),
            "question: {question:?}"
        );
    }
}

#[test]
fn test_filters_are_unique() {
    let parser = parser();
    for question in QUESTIONS {
        let query = parser.parse(question).unwrap();
        let mut seen = HashSet::new();
        for filter in &query.filters {
            assert!(
                seen.insert(filter.dedup_key()),
                "duplicate filter {filter:?} for {question:?}"
            );
        }
    }
}

#[test]
fn test_placeholder_parity_in_every_dialect() {
    let parser = parser();
    for dialect in Dialect::all() {
        let compiler = SqlCompiler::new(
            update_table(),
            CompileOptions::default().with_dialect(dialect),
        );
        for question in QUESTIONS {
            let query = parser.parse(question).unwrap();
            let compiled = compiler.compile(&query).unwrap();

            assert_eq!(
                count_placeholders(&compiled.statement, dialect),
                compiled.parameters.len(),
                "{dialect}: {}",
                compiled.statement
            );
            assert!(compiled.statement.ends_with(';'));
            assert!(!compiled.statement.ends_with(";;"));

            let statements =
                Parser::parse_sql(dialect.parser_dialect().as_ref(), &compiled.statement)
                    .unwrap_or_else(|e| panic!("{dialect}: {e}\n{}", compiled.statement));
            assert_eq!(statements.len(), 1);
        }
    }
}

#[test]
fn test_values_never_reach_the_statement() {
    let hostile = [
        r#"aws'; DROP TABLE "update"; --"#,
        "x\" OR \"1\"=\"1",
        "100%_done",
        "`backtick`",
    ];

    for dialect in Dialect::all() {
        let compiler = SqlCompiler::new(
            update_table(),
            CompileOptions::default().with_dialect(dialect),
        );
        for value in hostile {
            let query = ParsedQuery {
                select_columns: vec!["title".into()],
                filters: vec![
                    Filter::equals("provider", value),
                    Filter::new("title", FilterOperator::Contains, value),
                ],
                target_table: "update".into(),
                ..Default::default()
            };

            let compiled = compiler.compile(&query).unwrap();
            assert!(
                !compiled.statement.contains(value),
                "{dialect}: value leaked into {}",
                compiled.statement
            );
            assert_eq!(
                compiled.parameters,
                vec![SqlValue::from(value), SqlValue::Text(format!("%{value}%"))]
            );
        }
    }
}

#[test]
fn test_hostile_question_is_still_one_statement() {
    let parser = parser();
    let compiler = SqlCompiler::new(update_table(), CompileOptions::default());

    let query = parser
        .parse(r#"how many aws updates"; DELETE FROM "update"; --"#)
        .unwrap();
    let compiled = compiler.compile(&query).unwrap();

    assert!(!compiled.statement.to_uppercase().contains("DELETE"));
    assert_eq!(compiled.statement.matches(';').count(), 1);
}
