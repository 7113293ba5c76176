//! Schema catalog - the declarative description of the queryable table.
//!
//! The catalog is loaded once at startup and shared read-only between the
//! intent parser and the SQL compiler:
//!
//! ```text
//! schema document (.toml / .json) → [loader] → SchemaCatalog → Table
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use nlquery::catalog::load_table;
//! use std::path::Path;
//!
//! let table = load_table(Path::new("."), "schema/update.toml", "update")?;
//! assert_eq!(table.primary_key(), Some("id"));
//! ```

mod loader;

pub use loader::{load_catalog, load_table, parse_catalog, resolve_locator, SchemaFormat};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or validating a schema catalog.
#[derive(Debug, Error)]
pub enum SchemaError {
    /// Schema document not found
    #[error("Schema file not found: {path}")]
    FileNotFound { path: String },

    /// Unsupported file extension
    #[error("Unsupported schema extension: {extension}. Supported: .toml, .json")]
    UnsupportedExtension { extension: String },

    /// IO error reading the document
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Document could not be parsed
    #[error("Failed to parse schema {path}: {message}")]
    Parse { path: String, message: String },

    /// Document has no tables
    #[error("Schema is empty or not structured correctly: no tables defined")]
    NoTables,

    /// Expected table missing
    #[error("Table '{0}' not found in schema")]
    TableNotFound(String),

    /// Table without columns
    #[error("Table '{0}' has no columns")]
    EmptyTable(String),

    /// Column declared twice
    #[error("Duplicate column '{column}' in table '{table}'")]
    DuplicateColumn { table: String, column: String },

    /// More than one primary key column
    #[error("Table '{table}' declares more than one primary key: {columns:?}")]
    MultiplePrimaryKeys { table: String, columns: Vec<String> },
}

/// Result type for catalog operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Column data type.
///
/// Common aliases are accepted when reading a schema document so that
/// catalogs exported from different databases load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataType {
    #[serde(alias = "STRING", alias = "VARCHAR", alias = "text")]
    Text,
    #[serde(alias = "INT", alias = "BIGINT", alias = "integer")]
    Integer,
    #[serde(alias = "FLOAT", alias = "DOUBLE", alias = "NUMERIC", alias = "real")]
    Real,
    #[serde(alias = "date")]
    Date,
    #[serde(alias = "TIMESTAMP", alias = "datetime")]
    DateTime,
}

impl DataType {
    /// Whether values of this type are free text (eligible for entity linking).
    pub fn is_text(&self) -> bool {
        matches!(self, DataType::Text)
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::Text => "TEXT",
            DataType::Integer => "INTEGER",
            DataType::Real => "REAL",
            DataType::Date => "DATE",
            DataType::DateTime => "DATETIME",
        };
        f.write_str(name)
    }
}

/// A column of the catalog table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub is_primary_key: bool,
    /// Representative values, matched against free text for entity linking.
    #[serde(default)]
    pub examples: Vec<String>,
}

impl Column {
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            is_primary_key: false,
            examples: vec![],
        }
    }

    pub fn primary_key(mut self) -> Self {
        self.is_primary_key = true;
        self
    }

    pub fn with_examples(mut self, examples: &[&str]) -> Self {
        self.examples = examples.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Case-insensitive lookup of `text` in this column's examples.
    pub fn example_matching(&self, text: &str) -> Option<&str> {
        let wanted = text.to_lowercase();
        self.examples
            .iter()
            .find(|ex| ex.to_lowercase() == wanted)
            .map(String::as_str)
    }
}

/// A table description: name plus ordered columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: &str, columns: Vec<Column>) -> Self {
        Self {
            name: name.into(),
            columns,
        }
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Name of the first column, used as a projection of last resort.
    pub fn first_column(&self) -> Option<&str> {
        self.columns.first().map(|c| c.name.as_str())
    }

    /// The primary key column, falling back to the first column when none is flagged.
    pub fn primary_key(&self) -> Option<&str> {
        self.columns
            .iter()
            .find(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .or_else(|| self.first_column())
    }

    /// Columns whose examples take part in entity linking.
    pub fn text_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.data_type.is_text())
    }

    /// Check the structural invariants of the table.
    pub fn validate(&self) -> SchemaResult<()> {
        if self.columns.is_empty() {
            return Err(SchemaError::EmptyTable(self.name.clone()));
        }

        let mut seen = std::collections::HashSet::new();
        for column in &self.columns {
            if !seen.insert(column.name.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    table: self.name.clone(),
                    column: column.name.clone(),
                });
            }
        }

        let keys: Vec<String> = self
            .columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.clone())
            .collect();
        if keys.len() > 1 {
            return Err(SchemaError::MultiplePrimaryKeys {
                table: self.name.clone(),
                columns: keys,
            });
        }

        Ok(())
    }
}

/// The whole schema document: `{ tables: [...] }`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaCatalog {
    #[serde(default)]
    pub tables: Vec<Table>,
}

impl SchemaCatalog {
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// Extract the single table the engine works against.
    pub fn into_table(self, name: &str) -> SchemaResult<Table> {
        if self.tables.is_empty() {
            return Err(SchemaError::NoTables);
        }
        let table = self
            .tables
            .into_iter()
            .find(|t| t.name == name)
            .ok_or_else(|| SchemaError::TableNotFound(name.to_string()))?;
        table.validate()?;
        Ok(table)
    }
}
