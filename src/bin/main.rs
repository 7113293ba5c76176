//! nlquery CLI - ask questions about cloud provider updates in plain English
//!
//! Usage:
//!   nlquery [--config <file>] [-v] parse <question>
//!   nlquery [--config <file>] [-v] compile <question> [--dialect <dialect>] [--output <format>]
//!   nlquery [--config <file>] [-v] run <question> [--database <file>]
//!   nlquery [--config <file>] catalog
//!
//! Examples:
//!   nlquery parse "how many azure updates"
//!   nlquery compile "which are the top 3 AWS services mentioned in the updates" --dialect postgres
//!   nlquery run "show me updates for EC2" --database data/updates.db

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};
use nlquery::config::Settings;
use nlquery::engine::QueryEngine;
use nlquery::executor::{QueryOutcome, SqlExecutor, SqliteExecutor};
use nlquery::sql::Dialect;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nlquery")]
#[command(about = "Translate natural-language questions about cloud updates into parameterized SQL")]
#[command(version)]
struct Cli {
    /// Settings file (defaults to $NLQUERY_CONFIG, ./nlquery.toml, then the user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a question and print the structured query as JSON
    Parse {
        /// The question
        question: String,
    },

    /// Compile a question to SQL
    Compile {
        /// The question
        question: String,

        /// SQL dialect to generate (overrides the settings file)
        #[arg(short, long)]
        dialect: Option<DialectArg>,

        /// Output format
        #[arg(short, long, default_value = "sql")]
        output: OutputFormat,
    },

    /// Compile a question and run it against a SQLite database
    Run {
        /// The question
        question: String,

        /// SQLite database file (overrides the settings file)
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Show the loaded catalog table
    Catalog,
}

#[derive(Clone, ValueEnum)]
enum DialectArg {
    Sqlite,
    Duckdb,
    Postgres,
    Mysql,
}

impl From<DialectArg> for Dialect {
    fn from(arg: DialectArg) -> Self {
        match arg {
            DialectArg::Sqlite => Dialect::Sqlite,
            DialectArg::Duckdb => Dialect::DuckDb,
            DialectArg::Postgres => Dialect::Postgres,
            DialectArg::Mysql => Dialect::MySql,
        }
    }
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// SQL followed by the parameter list
    Sql,
    /// Parsed query and compiled SQL as JSON
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let settings = match load_settings(cli.config.as_ref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading settings: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Parse { question } => cmd_parse(settings, &question),
        Commands::Compile {
            question,
            dialect,
            output,
        } => cmd_compile(settings, &question, dialect, output),
        Commands::Run { question, database } => cmd_run(settings, &question, database),
        Commands::Catalog => cmd_catalog(settings),
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_settings(path: Option<&PathBuf>) -> Result<Settings, nlquery::config::SettingsError> {
    match path {
        Some(p) => Settings::from_file(p),
        None => Settings::load(),
    }
}

fn load_engine(settings: &Settings) -> Option<QueryEngine> {
    match QueryEngine::from_settings(settings) {
        Ok(engine) => Some(engine),
        Err(e) => {
            eprintln!("Error loading catalog: {}", e);
            None
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> ExitCode {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{}", json);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_parse(settings: Settings, question: &str) -> ExitCode {
    let Some(engine) = load_engine(&settings) else {
        return ExitCode::FAILURE;
    };

    match engine.parse(question) {
        Ok(parsed) => print_json(&parsed),
        Err(e) => {
            eprintln!("Parse error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn cmd_compile(
    mut settings: Settings,
    question: &str,
    dialect: Option<DialectArg>,
    output: OutputFormat,
) -> ExitCode {
    if let Some(dialect) = dialect {
        settings.compiler.dialect = dialect.into();
    }
    let Some(engine) = load_engine(&settings) else {
        return ExitCode::FAILURE;
    };

    let translation = match engine.translate(question) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match output {
        OutputFormat::Sql => {
            println!("{}", translation.sql.statement);
            if !translation.sql.parameters.is_empty() {
                let params: Vec<String> = translation
                    .sql
                    .parameters
                    .iter()
                    .map(ToString::to_string)
                    .collect();
                println!("-- parameters: [{}]", params.join(", "));
            }
            ExitCode::SUCCESS
        }
        OutputFormat::Json => print_json(&translation),
    }
}

fn cmd_run(settings: Settings, question: &str, database: Option<PathBuf>) -> ExitCode {
    let path = match database {
        Some(p) => p,
        None => match settings.database.resolved_path() {
            Ok(Some(p)) => p,
            Ok(None) => {
                eprintln!("No database given; pass --database or set [database].path");
                return ExitCode::FAILURE;
            }
            Err(e) => {
                eprintln!("Error resolving database path: {}", e);
                return ExitCode::FAILURE;
            }
        },
    };

    let Some(engine) = load_engine(&settings) else {
        return ExitCode::FAILURE;
    };

    let executor = match SqliteExecutor::open(&path) {
        Ok(x) => x,
        Err(e) => {
            eprintln!("Error opening database '{}': {}", path.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let translation = match engine.translate(question) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Compilation error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let outcome = QueryOutcome::from(executor.execute(&translation.sql));
    let code = print_json(&outcome);
    if outcome.success {
        code
    } else {
        ExitCode::FAILURE
    }
}

fn cmd_catalog(settings: Settings) -> ExitCode {
    let Some(engine) = load_engine(&settings) else {
        return ExitCode::FAILURE;
    };

    let table = engine.table();
    println!("Table: {}", table.name);
    println!();

    for column in &table.columns {
        let pk = if column.is_primary_key { " (primary key)" } else { "" };
        println!("  {} {}{}", column.name, column.data_type, pk);
        if !column.examples.is_empty() {
            println!("    examples: {}", column.examples.join(", "));
        }
    }

    ExitCode::SUCCESS
}
