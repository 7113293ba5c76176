//! Compilation from a [`ParsedQuery`] to parameterized SQL.
//!
//! ```text
//! ParsedQuery → Query (sql builder) → statement text + positional parameters
//! ```
//!
//! Filter values and the LIMIT never appear in the statement text; they are
//! bound through placeholders numbered in textual order (WHERE before LIMIT).
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use nlquery::catalog::{Column, DataType, Table};
//! use nlquery::compile::{CompileOptions, SqlCompiler};
//! use nlquery::intent::{Aggregation, Filter, Intent, ParsedQuery};
//!
//! let table = Table::new(
//!     "update",
//!     vec![
//!         Column::new("id", DataType::Integer).primary_key(),
//!         Column::new("provider", DataType::Text),
//!     ],
//! );
//! let query = ParsedQuery {
//!     intent: Intent::Count,
//!     filters: vec![Filter::equals("provider", "azure")],
//!     aggregations: vec![Aggregation::count("id", "total_count")],
//!     target_table: "update".into(),
//!     ..Default::default()
//! };
//!
//! let compiled = SqlCompiler::new(Arc::new(table), CompileOptions::default())
//!     .compile(&query)
//!     .unwrap();
//! assert_eq!(
//!     compiled.statement,
//!     r#"SELECT COUNT("id") AS "total_count" FROM "update" WHERE "provider" = ?;"#
//! );
//! ```

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use sqlparser::parser::Parser;

use crate::catalog::Table;
use crate::intent::{Aggregation, Filter, FilterOperator, ParsedQuery, SortDirection};
use crate::sql::expr::{alias, col, func, param, star, Expr, ExprExt};
use crate::sql::query::{OrderByExpr, Query, SelectExpr};
use crate::sql::Dialect;

static PLAIN_IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern is valid"));

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during compilation.
#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("query has no target table")]
    MissingTargetTable,

    #[error("table '{0}' is not in the catalog")]
    UnknownTable(String),

    #[error("'{0}' cannot be used as an ORDER BY alias")]
    InvalidAlias(String),

    #[error("unsupported operator '{operator}' on column '{column}'")]
    UnsupportedOperator { operator: String, column: String },

    #[error("LIMIT {0} is out of range")]
    LimitOutOfRange(u64),

    #[error("generated SQL does not parse: {message}")]
    InvalidStatement { message: String },

    #[error("generated SQL contains {0} statements")]
    MultipleStatements(usize),
}

pub type CompileResult<T> = Result<T, CompileError>;

// ============================================================================
// Options
// ============================================================================

/// Options for compilation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// SQL dialect to generate.
    pub dialect: Dialect,
    /// Reject unknown filter operators instead of treating them as EQUALS.
    pub strict_operators: bool,
    /// Re-parse the generated statement before returning it.
    pub verify_statement: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Sqlite,
            strict_operators: false,
            verify_statement: true,
        }
    }
}

impl CompileOptions {
    /// Set the SQL dialect.
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn strict(mut self) -> Self {
        self.strict_operators = true;
        self
    }
}

// ============================================================================
// Result Types
// ============================================================================

/// A value bound to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Integer(i64),
    Text(String),
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.into())
    }
}

impl std::fmt::Display for SqlValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlValue::Integer(n) => write!(f, "{n}"),
            SqlValue::Text(s) => write!(f, "{s:?}"),
        }
    }
}

/// Parameterized SQL ready for an executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledSql {
    /// Statement text with positional placeholders and one trailing `;`.
    pub statement: String,
    /// One value per placeholder, in textual order.
    pub parameters: Vec<SqlValue>,
    #[serde(skip)]
    pub dialect: Dialect,
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles parsed questions against one catalog table.
#[derive(Debug, Clone)]
pub struct SqlCompiler {
    table: Arc<Table>,
    options: CompileOptions,
}

impl SqlCompiler {
    pub fn new(table: Arc<Table>, options: CompileOptions) -> Self {
        Self { table, options }
    }

    pub fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compile `query` into a single parameterized statement.
    pub fn compile(&self, query: &ParsedQuery) -> CompileResult<CompiledSql> {
        if query.target_table.is_empty() {
            return Err(CompileError::MissingTargetTable);
        }
        if query.target_table != self.table.name {
            return Err(CompileError::UnknownTable(query.target_table.clone()));
        }

        let mut parameters = Vec::new();
        let mut sql = Query::new()
            .select(self.projection(query))
            .from(&self.table.name);

        for filter in &query.filters {
            let condition = self.condition(filter, &mut parameters)?;
            sql = sql.filter(condition);
        }

        if let Some(group_by) = &query.group_by_column {
            sql = sql.group_by(vec![col(group_by)]);
        }

        if let Some(order_by) = &query.order_by {
            let target = if query.is_aggregation_alias(&order_by.column) {
                if !PLAIN_IDENTIFIER.is_match(&order_by.column) {
                    return Err(CompileError::InvalidAlias(order_by.column.clone()));
                }
                alias(&order_by.column)
            } else {
                col(&order_by.column)
            };
            sql = sql.order_by(vec![match order_by.direction {
                SortDirection::Asc => OrderByExpr::asc(target),
                SortDirection::Desc => OrderByExpr::desc(target),
            }]);
        }

        if let Some(limit) = query.limit {
            let bound = i64::try_from(limit)
                .ok()
                .filter(|n| *n > 0)
                .ok_or(CompileError::LimitOutOfRange(limit))?;
            parameters.push(SqlValue::Integer(bound));
            sql = sql.limit(param(parameters.len()));
        }

        let dialect = self.options.dialect;
        debug_assert_eq!(
            sql.to_tokens_for_dialect(dialect).placeholder_count(),
            parameters.len()
        );

        let statement = sql.to_sql(dialect);
        if self.options.verify_statement {
            verify_single_statement(&statement, dialect)?;
        }

        tracing::debug!(%dialect, params = parameters.len(), "compiled statement");
        Ok(CompiledSql {
            statement,
            parameters,
            dialect,
        })
    }

    fn projection(&self, query: &ParsedQuery) -> Vec<SelectExpr> {
        let mut select: Vec<SelectExpr> = query
            .select_columns
            .iter()
            .map(|c| SelectExpr::new(col(c)))
            .collect();
        select.extend(query.aggregations.iter().map(aggregate));

        if select.is_empty() {
            let fallback = self.table.first_column().map(col).unwrap_or_else(star);
            tracing::debug!("empty projection, selecting the first column");
            select.push(SelectExpr::new(fallback));
        }
        select
    }

    fn condition(&self, filter: &Filter, parameters: &mut Vec<SqlValue>) -> CompileResult<Expr> {
        let column = col(&filter.column);

        let (condition, value) = match &filter.operator {
            FilterOperator::Equals => (column.eq(param(parameters.len() + 1)), filter.value.clone()),
            FilterOperator::Contains | FilterOperator::Like => (
                column.like(param(parameters.len() + 1)),
                format!("%{}%", filter.value),
            ),
            FilterOperator::GreaterThan => {
                (column.gt(param(parameters.len() + 1)), filter.value.clone())
            }
            FilterOperator::LessThan => (column.lt(param(parameters.len() + 1)), filter.value.clone()),
            FilterOperator::Other(name) => {
                if self.options.strict_operators {
                    return Err(CompileError::UnsupportedOperator {
                        operator: name.clone(),
                        column: filter.column.clone(),
                    });
                }
                tracing::warn!(
                    operator = %name,
                    column = %filter.column,
                    "unknown filter operator, comparing for equality"
                );
                (column.eq(param(parameters.len() + 1)), filter.value.clone())
            }
        };

        parameters.push(SqlValue::Text(value));
        Ok(condition)
    }
}

fn aggregate(aggregation: &Aggregation) -> SelectExpr {
    let argument = if aggregation.is_star() {
        star()
    } else {
        col(&aggregation.column)
    };
    let expr = SelectExpr::new(func(aggregation.kind.function_name(), vec![argument]));
    match &aggregation.alias {
        Some(name) => expr.with_alias(name),
        None => expr,
    }
}

fn verify_single_statement(statement: &str, dialect: Dialect) -> CompileResult<()> {
    let parsed = Parser::parse_sql(&*dialect.parser_dialect(), statement).map_err(|e| {
        CompileError::InvalidStatement {
            message: e.to_string(),
        }
    })?;

    match parsed.len() {
        1 => Ok(()),
        n => Err(CompileError::MultipleStatements(n)),
    }
}
