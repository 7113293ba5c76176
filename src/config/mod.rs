//! Configuration module for nlquery.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, CatalogSettings, DatabaseSettings, Settings, SettingsError, CONFIG_ENV_VAR,
};
