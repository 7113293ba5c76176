//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: SQLite, Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

// =============================================================================
// Parameter Markers
// =============================================================================

/// Anonymous positional marker.
/// Used by: SQLite, DuckDB, MySQL
pub fn placeholder_question(_index: usize) -> String {
    "?".into()
}

/// Numbered marker (`$1`, `$2`, ...).
/// Used by: Postgres
pub fn placeholder_dollar(index: usize) -> String {
    format!("${index}")
}
