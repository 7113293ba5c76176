//! # nlquery
//!
//! Turns plain-English questions about a catalog of cloud provider updates
//! into parameterized SQL.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │           Schema Catalog (.toml / .json)                 │
//! │  (one table: columns, types, primary key, examples)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [catalog loader]
//! ┌─────────────────────────────────────────────────────────┐
//! │   question ──▶ Intent Parser (rule cascade + NER)        │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ ParsedQuery
//! ┌─────────────────────────────────────────────────────────┐
//! │   SQL Compiler (sql builder, dialects, placeholders)     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ CompiledSql { statement, parameters }
//! ┌─────────────────────────────────────────────────────────┐
//! │                 SqlExecutor (SQLite)                     │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! [`engine::QueryEngine`] wires the stages together.

pub mod catalog;
pub mod compile;
pub mod config;
pub mod engine;
pub mod executor;
pub mod intent;
pub mod nlp;
pub mod sql;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::catalog::{Column, DataType, SchemaError, Table};
    pub use crate::compile::{CompileError, CompileOptions, CompiledSql, SqlCompiler, SqlValue};
    pub use crate::config::Settings;
    pub use crate::engine::{EngineError, QueryEngine, Translation};
    pub use crate::executor::{QueryOutcome, QueryRows, SqlExecutor, SqliteExecutor};
    pub use crate::intent::{
        AggregateKind, Aggregation, Filter, FilterOperator, Intent, IntentParser, OrderBy,
        ParseError, ParsedQuery, ParserOptions, SortDirection,
    };
    pub use crate::sql::Dialect;
}
