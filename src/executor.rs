//! Executing compiled statements.
//!
//! [`SqlExecutor`] is the seam between the compiler and a database. The
//! bundled [`SqliteExecutor`] binds [`CompiledSql::parameters`] positionally
//! and returns rows as JSON objects keyed by column name.

use std::path::Path;

use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{params_from_iter, Connection, ToSql};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::compile::{CompiledSql, SqlValue};

/// Errors that can occur while executing a statement.
#[derive(Debug, thiserror::Error)]
pub enum ExecutorError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("statement expects {expected} parameters, {actual} were given")]
    ParameterCount { expected: usize, actual: usize },
}

pub type ExecutorResult<T> = Result<T, ExecutorError>;

/// Result rows of one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct QueryRows {
    /// Column names in projection order.
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

impl QueryRows {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Anything that can run a [`CompiledSql`].
pub trait SqlExecutor {
    fn execute(&self, sql: &CompiledSql) -> ExecutorResult<QueryRows>;
}

/// Success/failure envelope for callers that report errors as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryOutcome {
    pub success: bool,
    pub data: Vec<Map<String, Value>>,
    pub error: Option<String>,
}

impl From<ExecutorResult<QueryRows>> for QueryOutcome {
    fn from(result: ExecutorResult<QueryRows>) -> Self {
        match result {
            Ok(rows) => Self {
                success: true,
                data: rows.rows,
                error: None,
            },
            Err(e) => Self {
                success: false,
                data: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Integer(n) => ToSqlOutput::from(*n),
            SqlValue::Text(s) => ToSqlOutput::from(s.as_str()),
        })
    }
}

/// SQLite-backed executor.
pub struct SqliteExecutor {
    conn: Connection,
}

impl SqliteExecutor {
    /// Open a database file.
    pub fn open(path: impl AsRef<Path>) -> ExecutorResult<Self> {
        let conn = Connection::open(path)?;
        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> ExecutorResult<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self { conn })
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Direct access to the connection, e.g. to load fixtures.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl SqlExecutor for SqliteExecutor {
    fn execute(&self, sql: &CompiledSql) -> ExecutorResult<QueryRows> {
        let mut stmt = self.conn.prepare(&sql.statement)?;

        let expected = stmt.parameter_count();
        if expected != sql.parameters.len() {
            return Err(ExecutorError::ParameterCount {
                expected,
                actual: sql.parameters.len(),
            });
        }

        let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
        let mut rows = stmt.query(params_from_iter(sql.parameters.iter()))?;

        let mut out = Vec::new();
        while let Some(row) = rows.next()? {
            let mut object = Map::new();
            for (i, name) in columns.iter().enumerate() {
                object.insert(name.clone(), json_value(row.get_ref(i)?));
            }
            out.push(object);
        }

        tracing::debug!(rows = out.len(), "executed statement");
        Ok(QueryRows { columns, rows: out })
    }
}

fn json_value(value: ValueRef<'_>) -> Value {
    match value {
        ValueRef::Null => Value::Null,
        ValueRef::Integer(n) => Value::from(n),
        ValueRef::Real(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        ValueRef::Text(bytes) => Value::String(String::from_utf8_lossy(bytes).into_owned()),
        ValueRef::Blob(bytes) => Value::Array(bytes.iter().map(|b| Value::from(*b)).collect()),
    }
}
