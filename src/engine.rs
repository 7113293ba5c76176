//! The question → SQL → rows pipeline.
//!
//! [`QueryEngine`] loads the catalog once and shares it between the parser
//! and the compiler. It holds no other state, so one engine can serve
//! concurrent callers.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use crate::catalog::{self, SchemaError, Table};
use crate::compile::{CompileError, CompileOptions, CompiledSql, SqlCompiler};
use crate::config::{Settings, SettingsError};
use crate::executor::{ExecutorError, QueryRows, SqlExecutor};
use crate::intent::{IntentParser, ParseError, ParsedQuery, ParserOptions};

/// Errors surfaced by the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Executor(#[from] ExecutorError),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// A parsed question together with its compiled SQL.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub parsed: ParsedQuery,
    pub sql: CompiledSql,
}

/// Parser and compiler bound to one catalog table.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    table: Arc<Table>,
    parser: IntentParser,
    compiler: SqlCompiler,
}

impl QueryEngine {
    pub fn new(table: Table, parser_options: ParserOptions, compile_options: CompileOptions) -> Self {
        let table = Arc::new(table);
        Self {
            parser: IntentParser::with_gazetteer(Arc::clone(&table), parser_options),
            compiler: SqlCompiler::new(Arc::clone(&table), compile_options),
            table,
        }
    }

    /// Load the catalog named by `settings` and build an engine around it.
    pub fn from_settings(settings: &Settings) -> EngineResult<Self> {
        let root = settings.catalog.resolved_root()?;
        let locator = settings.catalog.resolved_path()?;
        Self::load(
            &root,
            &locator,
            &settings.catalog.table,
            settings.parser.clone(),
            settings.compiler.clone(),
        )
    }

    /// Load `table` from the catalog at `locator` (relative to `root`).
    pub fn load(
        root: &Path,
        locator: &str,
        table: &str,
        parser_options: ParserOptions,
        compile_options: CompileOptions,
    ) -> EngineResult<Self> {
        let table = catalog::load_table(root, locator, table)?;
        tracing::info!(
            table = %table.name,
            columns = table.columns.len(),
            "catalog loaded"
        );
        Ok(Self::new(table, parser_options, compile_options))
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn parse(&self, question: &str) -> EngineResult<ParsedQuery> {
        Ok(self.parser.parse(question)?)
    }

    pub fn compile(&self, query: &ParsedQuery) -> EngineResult<CompiledSql> {
        Ok(self.compiler.compile(query)?)
    }

    /// Parse then compile.
    pub fn translate(&self, question: &str) -> EngineResult<Translation> {
        let parsed = self.parse(question)?;
        let sql = self.compile(&parsed)?;
        Ok(Translation { parsed, sql })
    }

    /// Parse, compile, and execute.
    pub fn run(&self, question: &str, executor: &dyn SqlExecutor) -> EngineResult<QueryRows> {
        let translation = self.translate(question)?;
        Ok(executor.execute(&translation.sql)?)
    }
}
