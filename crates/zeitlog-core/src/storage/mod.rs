mod config;
pub mod database;

pub use config::{Config, EntriesConfig, ProjectsConfig, StorageConfig};
pub use database::Database;

use std::path::PathBuf;

use crate::error::StorageError;

/// Returns `~/.config/zeitlog[-dev]/` based on ZEITLOG_ENV.
///
/// Set ZEITLOG_ENV=dev to use a development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf, StorageError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("ZEITLOG_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("zeitlog-dev")
    } else {
        base_dir.join("zeitlog")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
