//! Subcommand implementations.
//!
//! Every command opens the tracker against the configured data directory.
//! The logged-in session token lives in the database `kv` table.

pub mod account;
pub mod challenge;
pub mod config;
pub mod dashboard;
pub mod goals;
pub mod scoreboard;
pub mod toggle;

use serde::Serialize;
use streakboard_core::{Config, CoreError, Database, SystemClock, Tracker, User};
use tracing::warn;

pub const SESSION_KEY: &str = "session_token";

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

pub fn open_tracker() -> Result<Tracker, CoreError> {
    let config = Config::load()?;
    let db = Database::open(&config)?;
    Ok(Tracker::new(db, SystemClock, config))
}

/// Resolve the remembered session, forgetting it once it stops working.
pub fn current_user(tracker: &Tracker) -> Result<User, CoreError> {
    let token = tracker
        .db()
        .kv_get(SESSION_KEY)?
        .ok_or(CoreError::NotAuthenticated)?;
    tracker.authenticate(&token).inspect_err(|e| {
        if matches!(e, CoreError::NotAuthenticated) {
            if let Err(err) = tracker.db().kv_delete(SESSION_KEY) {
                warn!(error = %err, "could not forget stale session token");
            }
        }
    })
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
