//! Schema document loading.
//!
//! Currently supports:
//! - **TOML** (.toml)
//! - **JSON** (.json)
//!
//! Locators are resolved against a project root unless they are absolute.

use std::fs;
use std::path::{Path, PathBuf};

use super::{SchemaCatalog, SchemaError, SchemaResult, Table};

/// Format of a schema document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Toml,
    Json,
}

impl SchemaFormat {
    /// Select the format from a file extension.
    pub fn from_path(path: &Path) -> SchemaResult<Self> {
        let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        match extension {
            "toml" => Ok(SchemaFormat::Toml),
            "json" => Ok(SchemaFormat::Json),
            _ => Err(SchemaError::UnsupportedExtension {
                extension: extension.to_string(),
            }),
        }
    }
}

/// Resolve a schema locator relative to `root`.
pub fn resolve_locator(root: &Path, locator: &str) -> PathBuf {
    let path = Path::new(locator);
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Parse a schema document from a string.
///
/// `origin` is only used in error messages.
pub fn parse_catalog(content: &str, format: SchemaFormat, origin: &str) -> SchemaResult<SchemaCatalog> {
    let parsed = match format {
        SchemaFormat::Toml => toml::from_str::<SchemaCatalog>(content).map_err(|e| e.to_string()),
        SchemaFormat::Json => {
            serde_json::from_str::<SchemaCatalog>(content).map_err(|e| e.to_string())
        }
    };

    parsed.map_err(|message| SchemaError::Parse {
        path: origin.to_string(),
        message,
    })
}

/// Load the full schema document at `locator`.
pub fn load_catalog(root: &Path, locator: &str) -> SchemaResult<SchemaCatalog> {
    let path = resolve_locator(root, locator);
    if !path.exists() {
        return Err(SchemaError::FileNotFound {
            path: path.display().to_string(),
        });
    }

    let format = SchemaFormat::from_path(&path)?;
    let content = fs::read_to_string(&path)?;
    tracing::debug!(path = %path.display(), ?format, "loading schema catalog");

    parse_catalog(&content, format, &path.display().to_string())
}

/// Load the document at `locator` and extract the table named `table`.
pub fn load_table(root: &Path, locator: &str, table: &str) -> SchemaResult<Table> {
    let catalog = load_catalog(root, locator)?;
    let table = catalog.into_table(table)?;
    tracing::debug!(
        table = %table.name,
        columns = table.columns.len(),
        "schema table resolved"
    );
    Ok(table)
}
