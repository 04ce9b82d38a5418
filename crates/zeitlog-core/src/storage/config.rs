//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Database file location override
//! - Default display color for new projects
//! - Recent-entries query limit
//!
//! Configuration is stored at `~/.config/zeitlog/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;
use crate::model::DEFAULT_PROJECT_COLOR;

/// Storage configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StorageConfig {
    /// Database file path. Defaults to `<data_dir>/zeitlog.db` when unset.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
}

/// Project configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectsConfig {
    #[serde(default = "default_project_color")]
    pub default_color: String,
}

/// Entry listing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesConfig {
    /// How many entries the recent-entries query returns.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/zeitlog/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub projects: ProjectsConfig,
    #[serde(default)]
    pub entries: EntriesConfig,
}

impl Default for ProjectsConfig {
    fn default() -> Self {
        Self {
            default_color: default_project_color(),
        }
    }
}

impl Default for EntriesConfig {
    fn default() -> Self {
        Self {
            recent_limit: default_recent_limit(),
        }
    }
}

fn default_project_color() -> String {
    DEFAULT_PROJECT_COLOR.to_string()
}

fn default_recent_limit() -> u32 {
    50
}

impl Config {
    /// Load configuration from disk, falling back to defaults when the file
    /// does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::ParseFailed(e.to_string()))
    }

    /// Save configuration to disk.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let text =
            toml::to_string_pretty(self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        std::fs::write(&path, text).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })
    }

    fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/zeitlog"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Read a single value by key. Returns `None` for an unknown key.
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "database_path" => Some(
                self.storage
                    .database_path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            ),
            "default_color" => Some(self.projects.default_color.clone()),
            "recent_limit" => Some(self.entries.recent_limit.to_string()),
            _ => None,
        }
    }

    /// Update a single value by key.
    ///
    /// # Errors
    /// Returns an error for an unknown key or an unparsable value.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        match key {
            "database_path" => self.storage.database_path = Some(PathBuf::from(value)),
            "default_color" => self.projects.default_color = value.to_string(),
            "recent_limit" => {
                self.entries.recent_limit = value.parse().map_err(|_| {
                    ConfigError::ParseFailed(format!("recent_limit must be a number, got '{value}'"))
                })?;
            }
            _ => return Err(ConfigError::ParseFailed(format!("unknown key '{key}'"))),
        }
        Ok(())
    }

    /// Resolved database path: the configured override or the default
    /// location inside the data directory.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        if let Some(path) = &self.storage.database_path {
            return Ok(path.clone());
        }
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/zeitlog"),
            message: e.to_string(),
        })?;
        Ok(dir.join("zeitlog.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_sensible() {
        let config = Config::default();
        assert_eq!(config.projects.default_color, DEFAULT_PROJECT_COLOR);
        assert_eq!(config.entries.recent_limit, 50);
        assert!(config.storage.database_path.is_none());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config: Config = toml::from_str("[entries]\nrecent_limit = 10\n").unwrap();
        assert_eq!(config.entries.recent_limit, 10);
        assert_eq!(config.projects.default_color, DEFAULT_PROJECT_COLOR);
    }

    #[test]
    fn get_and_set_cover_every_key() {
        let mut config = Config::default();

        config.set("default_color", "#123456").unwrap();
        assert_eq!(config.get("default_color").as_deref(), Some("#123456"));

        config.set("recent_limit", "25").unwrap();
        assert_eq!(config.get("recent_limit").as_deref(), Some("25"));
        assert_eq!(config.entries.recent_limit, 25);

        config.set("database_path", "/tmp/zeitlog.db").unwrap();
        assert_eq!(config.get("database_path").as_deref(), Some("/tmp/zeitlog.db"));
    }

    #[test]
    fn set_rejects_unknown_keys_and_bad_values() {
        let mut config = Config::default();
        assert!(config.set("no_such_key", "x").is_err());
        assert!(config.set("recent_limit", "many").is_err());
        assert!(config.get("no_such_key").is_none());
    }

    #[test]
    fn roundtrips_through_toml() {
        let mut config = Config::default();
        config.projects.default_color = "#123456".to_string();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.projects.default_color, "#123456");
    }
}
