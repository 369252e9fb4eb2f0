//! Core error types for streakboard-core.
//!
//! Every failure the tracker can produce is a variant of [`CoreError`].
//! The boundary layer turns them into user-facing responses through
//! [`CoreError::status_code`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for streakboard-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Day number outside the challenge window.
    #[error("Invalid day {0}: must be between 1 and {max}", max = crate::challenge::CHALLENGE_DAYS)]
    InvalidDay(i64),

    /// A user tried to touch a goal they do not own.
    #[error("User {user_id} is not allowed to modify goal {goal_id}")]
    Unauthorized { user_id: i64, goal_id: i64 },

    /// Referenced record does not exist.
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Registration conflict.
    #[error("Username '{0}' already exists")]
    DuplicateUsername(String),

    /// Unique constraint lost to a concurrent write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// Username/password pair did not match.
    #[error("Invalid username or password")]
    InvalidCredentials,

    /// No session, or the session expired.
    #[error("Not logged in")]
    NotAuthenticated,

    /// Password hashing backend failure
    #[error("Credential error: {0}")]
    Credential(String),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Home directory could not be determined
    #[error("Could not determine a data directory")]
    NoDataDir,
}

/// Validation errors.
#[derive(Error, Debug)]
pub enum ValidationError {
    /// Empty field
    #[error("'{0}' must not be empty")]
    Empty(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl CoreError {
    /// HTTP-style status code for the boundary contract.
    pub fn status_code(&self) -> u16 {
        match self {
            CoreError::InvalidDay(_) | CoreError::Validation(_) => 400,
            CoreError::InvalidCredentials | CoreError::NotAuthenticated => 401,
            CoreError::Unauthorized { .. } => 403,
            CoreError::NotFound { .. } => 404,
            CoreError::DuplicateUsername(_) | CoreError::ConstraintViolation(_) => 409,
            CoreError::Credential(_)
            | CoreError::Database(_)
            | CoreError::Config(_)
            | CoreError::Io(_) => 500,
        }
    }

    pub(crate) fn not_found(entity: &'static str, id: impl ToString) -> Self {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
    }
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _)
                if matches!(
                    e.code,
                    rusqlite::ErrorCode::DatabaseLocked | rusqlite::ErrorCode::DatabaseBusy
                ) =>
            {
                DatabaseError::Locked
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, msg)
                if matches!(
                    e.extended_code,
                    rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                        | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
                ) =>
            {
                CoreError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| e.to_string()),
                )
            }
            _ => CoreError::Database(err.into()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
