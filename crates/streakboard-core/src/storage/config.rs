//! TOML-based application configuration.
//!
//! Stores:
//! - Database file name inside the data directory
//! - Login session lifetime
//! - Goals seeded for new users
//! - Default log level
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::{data_dir, resolve_data_dir};
use crate::error::{ConfigError, Result};
use crate::goals::DEFAULT_GOALS;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_file_name")]
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_lifetime_days")]
    pub lifetime_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalsConfig {
    /// Goal texts seeded at registration, in order.
    #[serde(default = "default_goals")]
    pub defaults: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` filter used when `STREAKBOARD_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub goals: GoalsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

const CONFIG_FILE: &str = "config.toml";

fn default_file_name() -> String {
    "streakboard.db".into()
}
fn default_lifetime_days() -> u32 {
    7
}
fn default_goals() -> Vec<String> {
    DEFAULT_GOALS.iter().map(|s| s.to_string()).collect()
}
fn default_level() -> String {
    "warn".into()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            file_name: default_file_name(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            lifetime_days: default_lifetime_days(),
        }
    }
}

impl Default for GoalsConfig {
    fn default() -> Self {
        Self {
            defaults: default_goals(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

impl Config {
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join(CONFIG_FILE))
    }

    /// Load from the data directory, writing defaults on first use.
    ///
    /// # Errors
    /// Returns an error if an existing file cannot be parsed, or the
    /// default file cannot be written.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match Self::read_existing(path)? {
            Some(cfg) => Ok(cfg),
            None => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
        }
    }

    /// Read the saved file without creating the data directory or writing
    /// defaults. `None` when there is no readable, valid file.
    pub fn peek() -> Option<Self> {
        let path = resolve_data_dir().ok()?.join(CONFIG_FILE);
        Self::read_existing(&path).ok().flatten()
    }

    fn read_existing(path: &Path) -> Result<Option<Self>, ConfigError> {
        let load_failed = |message: String| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(load_failed(e.to_string())),
        };
        let cfg: Config = toml::from_str(&content).map_err(|e| load_failed(e.to_string()))?;
        cfg.validate()?;
        Ok(Some(cfg))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.database.file_name.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "database.file_name".into(),
                message: "must not be empty".into(),
            });
        }
        if self.session.lifetime_days == 0 {
            return Err(ConfigError::InvalidValue {
                key: "session.lifetime_days".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    /// Read a value by dot-separated key, e.g. `session.lifetime_days`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let value = key
            .split('.')
            .try_fold(&json, |node, part| node.get(part))?;
        match value {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a value by dot-separated key without saving.
    ///
    /// The raw string is parsed according to the type already stored at
    /// that key; lists take a JSON array.
    pub fn set(&mut self, key: &str, raw: &str) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut json = serde_json::to_value(&*self).map_err(|e| invalid(e.to_string()))?;
        let slot = key
            .split('.')
            .try_fold(&mut json, |node, part| node.get_mut(part))
            .filter(|slot| !slot.is_object())
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;

        let replacement = match &*slot {
            serde_json::Value::Number(_) => raw
                .parse::<u64>()
                .map(serde_json::Value::from)
                .map_err(|e| invalid(e.to_string()))?,
            serde_json::Value::Bool(_) => raw
                .parse::<bool>()
                .map(serde_json::Value::Bool)
                .map_err(|e| invalid(e.to_string()))?,
            serde_json::Value::Array(_) => {
                serde_json::from_str(raw).map_err(|e| invalid(e.to_string()))?
            }
            _ => serde_json::Value::String(raw.to_string()),
        };
        *slot = replacement;

        let updated: Config = serde_json::from_value(json).map_err(|e| invalid(e.to_string()))?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }
}
