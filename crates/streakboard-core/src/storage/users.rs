use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::info;

use super::{parse_timestamp, Database};
use crate::auth::{Session, User};
use crate::error::{CoreError, Result};

fn row_to_user(row: &Row) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        created_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

fn row_to_session(row: &Row) -> rusqlite::Result<Session> {
    Ok(Session {
        token: row.get(0)?,
        user_id: row.get(1)?,
        created_at: parse_timestamp(2, &row.get::<_, String>(2)?)?,
        expires_at: parse_timestamp(3, &row.get::<_, String>(3)?)?,
    })
}

impl Database {
    // === Users ===

    /// Insert a user. Runs inside the caller's transaction, if any.
    pub fn insert_user(
        &self,
        username: &str,
        password_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<User> {
        self.conn()
            .execute(
                "INSERT INTO users (username, password_hash, created_at) VALUES (?1, ?2, ?3)",
                params![username, password_hash, now.to_rfc3339()],
            )
            .map_err(|e| match CoreError::from(e) {
                CoreError::ConstraintViolation(_) => {
                    CoreError::DuplicateUsername(username.to_string())
                }
                other => other,
            })?;

        Ok(User {
            id: self.conn().last_insert_rowid(),
            username: username.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
        })
    }

    pub fn user(&self, id: i64) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE id = ?1",
                params![id],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    pub fn user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = self
            .conn()
            .query_row(
                "SELECT id, username, password_hash, created_at FROM users WHERE username = ?1",
                params![username],
                row_to_user,
            )
            .optional()?;
        Ok(user)
    }

    /// All users in id order.
    pub fn list_users(&self) -> Result<Vec<User>> {
        let mut stmt = self
            .conn()
            .prepare("SELECT id, username, password_hash, created_at FROM users ORDER BY id")?;
        let users = stmt
            .query_map([], row_to_user)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(users)
    }

    /// Delete a user; goals, progress and sessions cascade.
    pub fn delete_user(&self, id: i64) -> Result<()> {
        let deleted = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(CoreError::not_found("user", id));
        }
        info!(user_id = id, "deleted user");
        Ok(())
    }

    // === Sessions ===

    pub fn insert_session(&self, session: &Session) -> Result<()> {
        self.conn().execute(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.token,
                session.user_id,
                session.created_at.to_rfc3339(),
                session.expires_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    pub fn session(&self, token: &str) -> Result<Option<Session>> {
        let session = self
            .conn()
            .query_row(
                "SELECT token, user_id, created_at, expires_at FROM sessions WHERE token = ?1",
                params![token],
                row_to_session,
            )
            .optional()?;
        Ok(session)
    }

    /// Returns whether a session was removed.
    pub fn delete_session(&self, token: &str) -> Result<bool> {
        let deleted = self
            .conn()
            .execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
        Ok(deleted > 0)
    }

    /// Drop sessions that expired before `now`. Returns how many were removed.
    pub fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<usize> {
        let mut stmt = self
            .conn()
            .prepare("SELECT token, user_id, created_at, expires_at FROM sessions")?;
        let expired: Vec<String> = stmt
            .query_map([], row_to_session)?
            .collect::<rusqlite::Result<Vec<_>>>()?
            .into_iter()
            .filter(|s| s.is_expired(now))
            .map(|s| s.token)
            .collect();

        for token in &expired {
            self.delete_session(token)?;
        }
        Ok(expired.len())
    }
}
