//! The parser's output contract: a structured, serializable query description.

use serde::{Deserialize, Serialize};

/// High-level operation class a question maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// Plain row lookup.
    #[default]
    FindData,
    /// Count matching rows.
    Count,
    /// Generic "most updates" grouping.
    FindMostFrequent,
    /// Ranked entities ("top N services", "the service with the most updates").
    FindMostFrequentEntity,
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Intent::FindData => "find_data",
            Intent::Count => "count",
            Intent::FindMostFrequent => "find_most_frequent",
            Intent::FindMostFrequentEntity => "find_most_frequent_entity",
        };
        f.write_str(name)
    }
}

/// Comparison applied by a filter.
///
/// Serialized as its upper-case name. Names this crate does not know are kept
/// in [`FilterOperator::Other`] so that hand-written queries still load; the
/// compiler decides what to do with them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FilterOperator {
    #[default]
    Equals,
    Contains,
    /// SQL LIKE; compiled like `Contains`.
    Like,
    GreaterThan,
    LessThan,
    Other(String),
}

impl FilterOperator {
    pub fn as_str(&self) -> &str {
        match self {
            FilterOperator::Equals => "EQUALS",
            FilterOperator::Contains => "CONTAINS",
            FilterOperator::Like => "LIKE",
            FilterOperator::GreaterThan => "GREATER_THAN",
            FilterOperator::LessThan => "LESS_THAN",
            FilterOperator::Other(name) => name,
        }
    }
}

impl From<String> for FilterOperator {
    fn from(name: String) -> Self {
        match name.to_uppercase().as_str() {
            "EQUALS" => FilterOperator::Equals,
            "CONTAINS" => FilterOperator::Contains,
            "LIKE" => FilterOperator::Like,
            "GREATER_THAN" => FilterOperator::GreaterThan,
            "LESS_THAN" => FilterOperator::LessThan,
            _ => FilterOperator::Other(name),
        }
    }
}

impl From<FilterOperator> for String {
    fn from(op: FilterOperator) -> Self {
        op.as_str().to_string()
    }
}

impl std::fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A `column <operator> value` restriction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Filter {
    pub column: String,
    #[serde(default)]
    pub operator: FilterOperator,
    pub value: String,
}

impl Filter {
    pub fn equals(column: &str, value: &str) -> Self {
        Self {
            column: column.into(),
            operator: FilterOperator::Equals,
            value: value.into(),
        }
    }

    pub fn new(column: &str, operator: FilterOperator, value: &str) -> Self {
        Self {
            column: column.into(),
            operator,
            value: value.into(),
        }
    }

    /// Identity used for deduplication: `(column, operator, lowercased value)`.
    pub fn dedup_key(&self) -> (String, String, String) {
        (
            self.column.clone(),
            self.operator.as_str().to_string(),
            self.value.to_lowercase(),
        )
    }

    /// Same column and same value, ignoring case.
    pub fn targets(&self, column: &str, value: &str) -> bool {
        self.column == column && self.value.to_lowercase() == value.to_lowercase()
    }
}

/// Aggregate function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AggregateKind {
    #[default]
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    pub fn function_name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }
}

fn star() -> String {
    "*".into()
}

/// An aggregate projection: `TYPE(column) AS alias`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregation {
    #[serde(rename = "type", default)]
    pub kind: AggregateKind,
    /// Column name, or `*`.
    #[serde(default = "star")]
    pub column: String,
    #[serde(default)]
    pub alias: Option<String>,
}

impl Aggregation {
    pub fn count(column: &str, alias: &str) -> Self {
        Self {
            kind: AggregateKind::Count,
            column: column.into(),
            alias: Some(alias.into()),
        }
    }

    pub fn is_star(&self) -> bool {
        self.column == "*"
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// ORDER BY target: a column or an aggregation alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub column: String,
    #[serde(default)]
    pub direction: SortDirection,
}

impl OrderBy {
    pub fn desc(column: &str) -> Self {
        Self {
            column: column.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Structured form of a natural-language question.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedQuery {
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub select_columns: Vec<String>,
    #[serde(default)]
    pub filters: Vec<Filter>,
    #[serde(default)]
    pub aggregations: Vec<Aggregation>,
    #[serde(default)]
    pub group_by_column: Option<String>,
    #[serde(default)]
    pub order_by: Option<OrderBy>,
    #[serde(default)]
    pub limit: Option<u64>,
    #[serde(default)]
    pub target_table: String,
}

impl ParsedQuery {
    /// Filters on `column`.
    pub fn filters_on<'a>(&'a self, column: &'a str) -> impl Iterator<Item = &'a Filter> + 'a {
        self.filters.iter().filter(move |f| f.column == column)
    }

    /// Whether `name` is the alias of one of this query's aggregations.
    pub fn is_aggregation_alias(&self, name: &str) -> bool {
        self.aggregations
            .iter()
            .any(|a| a.alias.as_deref() == Some(name))
    }
}
