use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, warn};

use super::{parse_timestamp, Database};
use crate::challenge::validate_day;
use crate::error::{CoreError, Result};
use crate::ledger::ProgressRecord;

const PROGRESS_COLUMNS: &str = "user_id, goal_id, day_number, completed, completed_at";

fn row_to_progress(row: &Row) -> rusqlite::Result<ProgressRecord> {
    let completed_at = row
        .get::<_, Option<String>>(4)?
        .map(|raw| parse_timestamp(4, &raw))
        .transpose()?;
    Ok(ProgressRecord {
        user_id: row.get(0)?,
        goal_id: row.get(1)?,
        day_number: row.get(2)?,
        completed: row.get(3)?,
        completed_at,
    })
}

impl Database {
    pub fn find_progress(
        &self,
        user_id: i64,
        goal_id: i64,
        day_number: u32,
    ) -> Result<Option<ProgressRecord>> {
        let record = self
            .conn()
            .query_row(
                &format!(
                    "SELECT {PROGRESS_COLUMNS} FROM daily_progress
                     WHERE user_id = ?1 AND goal_id = ?2 AND day_number = ?3"
                ),
                params![user_id, goal_id, day_number],
                row_to_progress,
            )
            .optional()?;
        Ok(record)
    }

    /// Insert a new record.
    ///
    /// # Errors
    /// [`CoreError::ConstraintViolation`] if a record for the same
    /// `(user, goal, day)` already exists.
    pub fn insert_progress(&self, record: &ProgressRecord) -> Result<()> {
        self.conn().execute(
            "INSERT INTO daily_progress (user_id, goal_id, day_number, completed, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                record.user_id,
                record.goal_id,
                record.day_number,
                record.completed,
                record.completed_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    pub fn update_progress(&self, record: &ProgressRecord) -> Result<()> {
        self.conn().execute(
            "UPDATE daily_progress SET completed = ?1, completed_at = ?2
             WHERE user_id = ?3 AND goal_id = ?4 AND day_number = ?5",
            params![
                record.completed,
                record.completed_at.map(|t| t.to_rfc3339()),
                record.user_id,
                record.goal_id,
                record.day_number,
            ],
        )?;
        Ok(())
    }

    /// All of a user's records, ordered by day then goal.
    pub fn list_progress(&self, user_id: i64) -> Result<Vec<ProgressRecord>> {
        let mut stmt = self.conn().prepare(&format!(
            "SELECT {PROGRESS_COLUMNS} FROM daily_progress
             WHERE user_id = ?1
             ORDER BY day_number ASC, goal_id ASC"
        ))?;
        let records = stmt
            .query_map(params![user_id], row_to_progress)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    /// Flip completion of one goal on one day and return the stored record.
    ///
    /// Ownership is checked inside the write transaction, so a goal deleted
    /// concurrently reads as [`CoreError::NotFound`].
    ///
    /// # Errors
    /// [`CoreError::InvalidDay`] outside the window, [`CoreError::NotFound`]
    /// or [`CoreError::Unauthorized`] for a goal the user does not own.
    pub fn toggle_progress(
        &self,
        user_id: i64,
        goal_id: i64,
        day: i64,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        let day_number = validate_day(day)?;

        self.write_tx(|| {
            self.owned_goal(user_id, goal_id)?;
            match self.find_progress(user_id, goal_id, day_number)? {
                Some(existing) => self.store_toggled(existing, now),
                None => self.insert_first_check(
                    ProgressRecord::first_check(user_id, goal_id, day_number, now),
                    now,
                ),
            }
        })
        .inspect(|record| {
            debug!(user_id, goal_id, day_number, completed = record.completed, "toggled progress");
        })
    }

    fn store_toggled(&self, existing: ProgressRecord, now: DateTime<Utc>) -> Result<ProgressRecord> {
        let next = existing.toggled(now);
        self.update_progress(&next)?;
        Ok(next)
    }

    /// Insert `first`; if another writer stored the same key since the
    /// lookup, toggle that record once instead.
    fn insert_first_check(
        &self,
        first: ProgressRecord,
        now: DateTime<Utc>,
    ) -> Result<ProgressRecord> {
        match self.insert_progress(&first) {
            Ok(()) => Ok(first),
            Err(CoreError::ConstraintViolation(reason)) => {
                let (user_id, goal_id, day_number) = (first.user_id, first.goal_id, first.day_number);
                warn!(user_id, goal_id, day_number, %reason, "lost insert race, toggling existing record");
                let existing = self
                    .find_progress(user_id, goal_id, day_number)?
                    .ok_or(CoreError::ConstraintViolation(reason))?;
                self.store_toggled(existing, now)
            }
            Err(e) => Err(e),
        }
    }
}
