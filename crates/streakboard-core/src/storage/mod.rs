mod config;
pub mod database;
mod goals;
pub mod migrations;
mod progress;
mod users;

pub use config::{Config, DatabaseConfig, GoalsConfig, LoggingConfig, SessionConfig};
pub use database::Database;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::types::Type;
use std::path::PathBuf;

use crate::error::{ConfigError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the data directory, creating it if needed.
///
/// `STREAKBOARD_HOME` wins outright. Otherwise `~/.config/streakboard`, or
/// `~/.config/streakboard-dev` when `STREAKBOARD_ENV=dev`.
///
/// # Errors
/// Returns an error if no home directory can be found or the directory
/// cannot be created.
pub fn data_dir() -> Result<PathBuf> {
    let dir = resolve_data_dir()?;
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Same location as [`data_dir`], without touching the filesystem.
pub(crate) fn resolve_data_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = std::env::var_os("STREAKBOARD_HOME") {
        return Ok(PathBuf::from(home));
    }
    let base = dirs::home_dir().ok_or(ConfigError::NoDataDir)?.join(".config");
    let env = std::env::var("STREAKBOARD_ENV").unwrap_or_else(|_| "production".into());
    Ok(if env == "dev" {
        base.join("streakboard-dev")
    } else {
        base.join("streakboard")
    })
}

pub(crate) fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

pub(crate) fn parse_timestamp(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}
