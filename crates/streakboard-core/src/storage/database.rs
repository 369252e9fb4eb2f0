//! SQLite-backed store for users, the challenge, goals and daily progress.
//!
//! `Database` wraps one connection. Record-specific queries live next to
//! this file (`users.rs`, `goals.rs`, `progress.rs`) as further `impl`
//! blocks; this file owns opening, migrations, transactions, the challenge
//! row and the key/value table.

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{data_dir, format_date, migrations, parse_date, parse_timestamp, Config};
use crate::challenge::Challenge;
use crate::error::{CoreError, DatabaseError, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// On-disk location, `None` for in-memory databases.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open the database named in `config` inside the data directory.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(config: &Config) -> Result<Self> {
        let path = data_dir()?.join(&config.database.file_name);
        Self::open_at(path)
    }

    /// Open (or create) a database file at `path`.
    pub fn open_at(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "opened database");
        Self::init(conn, Some(path))
    }

    /// Open an in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| DatabaseError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT).map_err(DatabaseError::from)?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(DatabaseError::from)?;
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn, path })
    }

    /// Run `f` inside `BEGIN IMMEDIATE ... COMMIT`, rolling back on error.
    ///
    /// Must not be nested.
    pub(crate) fn write_tx<T>(&self, f: impl FnOnce() -> Result<T>) -> Result<T> {
        self.conn
            .execute_batch("BEGIN IMMEDIATE TRANSACTION;")
            .map_err(DatabaseError::from)?;
        match f() {
            Ok(value) => {
                self.conn
                    .execute_batch("COMMIT;")
                    .map_err(DatabaseError::from)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch("ROLLBACK;") {
                    warn!(error = %rollback, "rollback failed");
                }
                Err(err)
            }
        }
    }

    // === Challenge ===

    pub fn challenge(&self) -> Result<Option<Challenge>> {
        let challenge = self
            .conn
            .query_row(
                "SELECT start_date, is_active, created_at FROM challenge WHERE id = 1",
                [],
                |row| {
                    Ok(Challenge {
                        start_date: parse_date(0, &row.get::<_, String>(0)?)?,
                        is_active: row.get(1)?,
                        created_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
                    })
                },
            )
            .optional()?;
        Ok(challenge)
    }

    /// Return the challenge, creating it to start on `today` if absent.
    pub fn ensure_challenge(&self, today: NaiveDate, now: DateTime<Utc>) -> Result<Challenge> {
        let inserted = self.conn.execute(
            "INSERT OR IGNORE INTO challenge (id, start_date, is_active, created_at)
             VALUES (1, ?1, 1, ?2)",
            params![format_date(today), now.to_rfc3339()],
        )?;
        if inserted > 0 {
            info!(start_date = %today, "created challenge");
        }
        self.challenge()?
            .ok_or_else(|| CoreError::not_found("challenge", 1))
    }

    pub fn set_challenge_start(&self, start_date: NaiveDate) -> Result<Challenge> {
        let updated = self.conn.execute(
            "UPDATE challenge SET start_date = ?1 WHERE id = 1",
            params![format_date(start_date)],
        )?;
        if updated == 0 {
            return Err(CoreError::not_found("challenge", 1));
        }
        info!(start_date = %start_date, "challenge start date updated");
        self.challenge()?
            .ok_or_else(|| CoreError::not_found("challenge", 1))
    }

    pub fn set_challenge_active(&self, is_active: bool) -> Result<Challenge> {
        let updated = self.conn.execute(
            "UPDATE challenge SET is_active = ?1 WHERE id = 1",
            params![is_active],
        )?;
        if updated == 0 {
            return Err(CoreError::not_found("challenge", 1));
        }
        info!(is_active, "challenge activity updated");
        self.challenge()?
            .ok_or_else(|| CoreError::not_found("challenge", 1))
    }

    // === Key/value ===

    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get::<_, String>(0)
            })
            .optional()?;
        Ok(value)
    }

    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    pub fn kv_delete(&self, key: &str) -> Result<()> {
        self.conn
            .execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn challenge_is_created_once() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.challenge().unwrap().is_none());

        let first = db.ensure_challenge(date(2024, 1, 1), Utc::now()).unwrap();
        assert_eq!(first.start_date, date(2024, 1, 1));
        assert!(first.is_active);

        let again = db.ensure_challenge(date(2024, 5, 5), Utc::now()).unwrap();
        assert_eq!(again.start_date, date(2024, 1, 1));
    }

    #[test]
    fn challenge_updates() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            db.set_challenge_start(date(2024, 1, 1)),
            Err(CoreError::NotFound { .. })
        ));

        db.ensure_challenge(date(2024, 1, 1), Utc::now()).unwrap();
        let moved = db.set_challenge_start(date(2024, 2, 1)).unwrap();
        assert_eq!(moved.start_date, date(2024, 2, 1));

        let paused = db.set_challenge_active(false).unwrap();
        assert!(!paused.is_active);
    }

    #[test]
    fn kv_store() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
        db.kv_set("test", "hello").unwrap();
        assert_eq!(db.kv_get("test").unwrap().as_deref(), Some("hello"));
        db.kv_delete("test").unwrap();
        assert!(db.kv_get("test").unwrap().is_none());
    }

    #[test]
    fn write_tx_rolls_back_on_error() {
        let db = Database::open_in_memory().unwrap();
        let result: Result<()> = db.write_tx(|| {
            db.kv_set("partial", "1")?;
            Err(CoreError::InvalidDay(0))
        });
        assert!(result.is_err());
        assert!(db.kv_get("partial").unwrap().is_none());
    }

    #[test]
    fn reopening_a_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("streakboard.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.kv_set("k", "v").unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.path(), Some(path.as_path()));
        assert_eq!(db.kv_get("k").unwrap().as_deref(), Some("v"));
    }
}
