//! Integration tests for the intent parser against the bundled catalog.

use std::path::PathBuf;
use std::sync::Arc;

use nlquery::catalog::{load_table, Table};
use nlquery::intent::{
    AggregateKind, Filter, FilterOperator, Intent, IntentParser, OrderBy, ParsedQuery,
    ParserOptions, SortDirection,
};

fn update_table() -> Table {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    load_table(&root, "schema/update.toml", "update").unwrap()
}

fn parse(text: &str) -> ParsedQuery {
    IntentParser::with_gazetteer(Arc::new(update_table()), ParserOptions::default())
        .parse(text)
        .unwrap()
}

fn provider_filters(query: &ParsedQuery) -> Vec<&Filter> {
    query.filters_on("provider").collect()
}

// ============================================================================
// Intent precedence
// ============================================================================

#[test]
fn test_top_n_services() {
    let query = parse("which are the top 3 AWS services mentioned in the updates");

    assert_eq!(query.intent, Intent::FindMostFrequentEntity);
    assert_eq!(query.group_by_column.as_deref(), Some("product_name"));
    assert_eq!(query.select_columns, vec!["product_name"]);
    assert_eq!(query.limit, Some(3));
    assert_eq!(query.order_by, Some(OrderBy::desc("mention_count")));
    assert_eq!(
        provider_filters(&query),
        vec![&Filter::equals("provider", "aws")]
    );

    assert_eq!(query.aggregations.len(), 1);
    assert_eq!(query.aggregations[0].kind, AggregateKind::Count);
    assert_eq!(query.aggregations[0].column, "id");
    assert_eq!(query.aggregations[0].alias.as_deref(), Some("mention_count"));
}

#[test]
fn test_top_n_wins_over_count_keywords() {
    let query = parse("count the top 5 products");

    assert_eq!(query.intent, Intent::FindMostFrequentEntity);
    assert_eq!(query.limit, Some(5));
    assert_eq!(query.aggregations[0].alias.as_deref(), Some("mention_count"));
}

#[test]
fn test_top_n_accepts_grouped_digits() {
    let query = parse("top 1,000 services");
    assert_eq!(query.limit, Some(1000));
}

#[test]
fn test_top_n_without_entity_falls_through() {
    let query = parse("top 3 updates");

    assert_eq!(query.intent, Intent::FindData);
    assert_eq!(query.limit, None);
    assert_eq!(query.group_by_column, None);
}

#[test]
fn test_count() {
    let query = parse("how many azure updates");

    assert_eq!(query.intent, Intent::Count);
    assert!(query.select_columns.is_empty());
    assert_eq!(query.aggregations.len(), 1);
    assert_eq!(query.aggregations[0].kind, AggregateKind::Count);
    assert_eq!(query.aggregations[0].alias.as_deref(), Some("total_count"));
    assert_eq!(query.order_by, None);
    assert_eq!(query.limit, None);
    assert_eq!(query.filters, vec![Filter::equals("provider", "azure")]);
}

#[test]
fn test_count_keyword() {
    let query = parse("Count Lambda updates");

    assert_eq!(query.intent, Intent::Count);
    assert_eq!(
        query.filters,
        vec![Filter::equals("product_name", "Lambda")]
    );
}

#[test]
fn test_most_updates() {
    let query = parse("which products got the most updates");

    assert_eq!(query.intent, Intent::FindMostFrequent);
    assert_eq!(query.group_by_column.as_deref(), Some("product_name"));
    assert_eq!(query.select_columns, vec!["product_name"]);
    assert_eq!(query.limit, Some(5));
    assert_eq!(
        query.order_by,
        Some(OrderBy {
            column: "update_count".into(),
            direction: SortDirection::Desc,
        })
    );
}

#[test]
fn test_service_with_the_most_updates() {
    let query = parse("which is the AWS service with the most updates");

    assert_eq!(query.intent, Intent::FindMostFrequentEntity);
    assert_eq!(query.limit, Some(1));
    assert_eq!(query.select_columns, vec!["product_name"]);
    assert_eq!(query.group_by_column.as_deref(), Some("product_name"));
    assert_eq!(query.order_by, Some(OrderBy::desc("update_count")));
    assert_eq!(query.filters, vec![Filter::equals("provider", "aws")]);
}

#[test]
fn test_service_phrase_replaces_other_providers() {
    let query = parse("azure or the aws service with the most updates");

    assert_eq!(query.intent, Intent::FindMostFrequentEntity);
    assert_eq!(
        provider_filters(&query),
        vec![&Filter::equals("provider", "aws")]
    );
}

// ============================================================================
// Default fallback and entity linking
// ============================================================================

#[test]
fn test_default_find_data() {
    let query = parse("show me updates for EC2");

    assert_eq!(query.intent, Intent::FindData);
    assert_eq!(
        query.select_columns,
        ParserOptions::default().default_select_columns
    );
    assert!(query.aggregations.is_empty());

    let products: Vec<_> = query.filters_on("product_name").collect();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].operator, FilterOperator::Equals);
    assert_eq!(products[0].value, "EC2");
}

#[test]
fn test_multi_word_product() {
    let query = parse("what changed in Azure Functions this week");

    assert_eq!(
        query.filters_on("product_name").collect::<Vec<_>>(),
        vec![&Filter::equals("product_name", "Azure Functions")]
    );
    // "azure" is consumed by the longer product name, then added back as a keyword
    assert_eq!(
        provider_filters(&query),
        vec![&Filter::equals("provider", "azure")]
    );
}

#[test]
fn test_substring_match_binds_catalog_casing() {
    let query = parse("anything new for dynamodb-streams?");
    assert_eq!(
        query.filters_on("product_name").collect::<Vec<_>>(),
        vec![&Filter::equals("product_name", "DynamoDB")]
    );
}

#[test]
fn test_no_entities_no_filters() {
    let query = parse("show me the latest news");

    assert_eq!(query.intent, Intent::FindData);
    assert!(query.filters.is_empty());
    assert_eq!(query.target_table, "update");
}

// ============================================================================
// Custom options
// ============================================================================

#[test]
fn test_custom_provider_keywords() {
    let options = ParserOptions {
        provider_keywords: vec!["gcp".into()],
        most_frequent_limit: 2,
        ..Default::default()
    };
    let parser = IntentParser::with_gazetteer(Arc::new(update_table()), options);

    let query = parser.parse("gcp products with the most updates").unwrap();
    assert_eq!(query.intent, Intent::FindMostFrequent);
    assert_eq!(query.limit, Some(2));
    assert_eq!(query.filters, vec![Filter::equals("provider", "gcp")]);
}
