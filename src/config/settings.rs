//! TOML-based configuration for nlquery.
//!
//! Supports a config file (nlquery.toml) with environment variable expansion
//! in paths.
//!
//! Example configuration:
//! ```toml
//! [catalog]
//! root = "${NLQUERY_HOME}"
//! path = "schema/update.toml"
//! table = "update"
//!
//! [parser]
//! provider_keywords = ["aws", "azure"]
//! most_frequent_limit = 5
//!
//! [compiler]
//! dialect = "sqlite"
//! strict_operators = false
//!
//! [database]
//! path = "./data/updates.db"
//! ```

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::compile::CompileOptions;
use crate::intent::ParserOptions;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "NLQUERY_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
}

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Where the schema catalog lives.
    pub catalog: CatalogSettings,

    /// Column names and keyword lists for the intent parser.
    pub parser: ParserOptions,

    /// SQL generation options.
    pub compiler: CompileOptions,

    /// Database used by `run`.
    pub database: DatabaseSettings,
}

/// Schema catalog location.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CatalogSettings {
    /// Project root the catalog path is resolved against (supports ${ENV_VAR}).
    pub root: String,

    /// Catalog file, relative to `root` unless absolute (supports ${ENV_VAR}).
    pub path: String,

    /// Name of the table questions are asked about.
    pub table: String,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            path: "schema/update.toml".to_string(),
            table: "update".to_string(),
        }
    }
}

impl CatalogSettings {
    /// Project root with environment variables expanded.
    pub fn resolved_root(&self) -> Result<PathBuf, SettingsError> {
        expand_env_vars(&self.root).map(PathBuf::from)
    }

    /// Catalog locator with environment variables expanded.
    pub fn resolved_path(&self) -> Result<String, SettingsError> {
        expand_env_vars(&self.path)
    }
}

/// Database configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite database file (supports ${ENV_VAR} expansion).
    pub path: Option<String>,
}

impl DatabaseSettings {
    /// Database path with environment variables expanded.
    pub fn resolved_path(&self) -> Result<Option<PathBuf>, SettingsError> {
        self.path
            .as_deref()
            .map(|p| expand_env_vars(p).map(PathBuf::from))
            .transpose()
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content)?;
        tracing::debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `NLQUERY_CONFIG`
    /// 2. `./nlquery.toml`
    /// 3. `~/.config/nlquery/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("nlquery.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("nlquery").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.peek() == Some(&'{') {
            chars.next(); // consume '{'
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            // $VAR (ends at non-alphanumeric/underscore)
            let mut name = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_alphanumeric() || ch == '_' {
                    name.push(ch);
                    chars.next();
                } else {
                    break;
                }
            }
            if name.is_empty() {
                // Just a lone $, keep it
                result.push('$');
                continue;
            }
            name
        };

        let value =
            env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
