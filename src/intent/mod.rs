//! Natural-language question parsing.
//!
//! [`IntentParser`] turns free text into a [`ParsedQuery`] by running the
//! rule cascade in [`rules`] over the output of a [`TextAnalyzer`].
//!
//! ```text
//! "how many azure updates"
//!        │ lowercase + analyze
//!        ▼
//!   tokens, lemmas, entities
//!        │ CASCADE (guard → effect, in order)
//!        ▼
//!   QueryDraft ──finish──▶ ParsedQuery
//! ```

pub mod query;
pub mod rules;

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Table;
use crate::nlp::{GazetteerAnalyzer, TextAnalyzer, DEFAULT_ORGANIZATIONS};

pub use query::{
    AggregateKind, Aggregation, Filter, FilterOperator, Intent, OrderBy, ParsedQuery,
    SortDirection,
};
use rules::{run_cascade, ParseContext};

/// Error produced by the parser.
///
/// Ambiguous questions are not errors: they fall back to
/// [`Intent::FindData`].
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("schema for table '{table}' is unavailable: {reason}")]
    SchemaUnavailable { table: String, reason: String },
}

/// Column names and word lists the cascade works with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Column holding the cloud provider.
    pub provider_column: String,
    /// Column holding the product or service name.
    pub product_column: String,
    /// Projection used when no rule matched.
    pub default_select_columns: Vec<String>,
    /// Provider names recognized as plain substrings, in priority order.
    pub provider_keywords: Vec<String>,
    /// LIMIT used by the generic "most updates" rule.
    pub most_frequent_limit: u64,
    /// Lemmas that make "top N" group by the product column.
    pub entity_words: Vec<String>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            provider_column: "provider".into(),
            product_column: "product_name".into(),
            default_select_columns: vec![
                "title".into(),
                "provider".into(),
                "product_name".into(),
                "published_date".into(),
            ],
            provider_keywords: vec!["aws".into(), "azure".into()],
            most_frequent_limit: 5,
            entity_words: vec!["service".into(), "product".into()],
        }
    }
}

/// Rule-based question parser bound to one catalog table.
#[derive(Debug, Clone)]
pub struct IntentParser {
    table: Arc<Table>,
    analyzer: Arc<dyn TextAnalyzer>,
    options: ParserOptions,
}

impl IntentParser {
    pub fn new(table: Arc<Table>, analyzer: Arc<dyn TextAnalyzer>, options: ParserOptions) -> Self {
        Self {
            table,
            analyzer,
            options,
        }
    }

    /// Parser using a gazetteer built from the table's example values.
    pub fn with_gazetteer(table: Arc<Table>, options: ParserOptions) -> Self {
        let analyzer = GazetteerAnalyzer::from_table(&table, DEFAULT_ORGANIZATIONS);
        Self::new(table, Arc::new(analyzer), options)
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Parse a question.
    pub fn parse(&self, text: &str) -> Result<ParsedQuery, ParseError> {
        self.check_schema()?;

        let lowered = text.to_lowercase();
        let analysis = self.analyzer.analyze(&lowered);
        let ctx = ParseContext {
            text: &lowered,
            analysis: &analysis,
            table: &self.table,
            options: &self.options,
        };

        let query = run_cascade(&ctx).finish(&self.table.name);
        tracing::debug!(
            intent = %query.intent,
            filters = query.filters.len(),
            "parsed question"
        );
        Ok(query)
    }

    fn check_schema(&self) -> Result<(), ParseError> {
        let unavailable = |reason: &str| ParseError::SchemaUnavailable {
            table: self.table.name.clone(),
            reason: reason.to_string(),
        };

        if self.table.name.is_empty() {
            return Err(unavailable("table has no name"));
        }
        if self.table.columns.is_empty() {
            return Err(unavailable("table has no columns"));
        }
        Ok(())
    }
}
