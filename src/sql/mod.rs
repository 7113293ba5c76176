//! SQL generation module.
//!
//! A small type-safe builder for the single-table, parameterized SELECT
//! statements the compiler produces:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{alias, col, count, func, param, star, BinaryOperator, Expr, ExprExt};
pub use query::{OrderByExpr, Query, SelectExpr, SortDir};
pub use token::{Token, TokenStream};
