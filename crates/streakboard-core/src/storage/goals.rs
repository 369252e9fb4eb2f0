use chrono::{DateTime, Utc};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

use super::{parse_timestamp, Database};
use crate::error::{CoreError, Result};
use crate::goals::{plan_replace, Goal, GoalDraft};

fn row_to_goal(row: &Row) -> rusqlite::Result<Goal> {
    Ok(Goal {
        id: row.get(0)?,
        user_id: row.get(1)?,
        text: row.get(2)?,
        order: row.get(3)?,
        created_at: parse_timestamp(4, &row.get::<_, String>(4)?)?,
    })
}

impl Database {
    pub fn goal(&self, id: i64) -> Result<Option<Goal>> {
        let goal = self
            .conn()
            .query_row(
                "SELECT id, user_id, goal_text, sort_order, created_at FROM goals WHERE id = ?1",
                params![id],
                row_to_goal,
            )
            .optional()?;
        Ok(goal)
    }

    /// Fetch a goal and check it belongs to `user_id`.
    ///
    /// # Errors
    /// [`CoreError::NotFound`] for an unknown id, [`CoreError::Unauthorized`]
    /// when someone else owns it.
    pub fn owned_goal(&self, user_id: i64, goal_id: i64) -> Result<Goal> {
        let goal = self
            .goal(goal_id)?
            .ok_or_else(|| CoreError::not_found("goal", goal_id))?;
        if goal.user_id != user_id {
            return Err(CoreError::Unauthorized { user_id, goal_id });
        }
        Ok(goal)
    }

    /// The user's goals by `order`, then id.
    pub fn list_goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        let mut stmt = self.conn().prepare(
            "SELECT id, user_id, goal_text, sort_order, created_at
             FROM goals
             WHERE user_id = ?1
             ORDER BY sort_order ASC, id ASC",
        )?;
        let goals = stmt
            .query_map(params![user_id], row_to_goal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(goals)
    }

    pub fn goal_count(&self, user_id: i64) -> Result<u32> {
        let count = self.conn().query_row(
            "SELECT COUNT(*) FROM goals WHERE user_id = ?1",
            params![user_id],
            |row| row.get::<_, u32>(0),
        )?;
        Ok(count)
    }

    pub fn insert_goal(
        &self,
        user_id: i64,
        text: &str,
        order: u32,
        now: DateTime<Utc>,
    ) -> Result<i64> {
        self.conn().execute(
            "INSERT INTO goals (user_id, goal_text, sort_order, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, text, order, now.to_rfc3339()],
        )?;
        Ok(self.conn().last_insert_rowid())
    }

    /// Replace the user's goal list with `drafts` in one transaction.
    ///
    /// Goals missing from `drafts` are deleted along with their progress.
    pub fn replace_goals(
        &self,
        user_id: i64,
        drafts: &[GoalDraft],
        now: DateTime<Utc>,
    ) -> Result<Vec<Goal>> {
        self.write_tx(|| {
            let existing = self.list_goals(user_id)?;
            let plan = plan_replace(&existing, drafts)?;

            if let Some(&goal_id) = plan.unknown.first() {
                return Err(match self.goal(goal_id)? {
                    Some(_) => CoreError::Unauthorized { user_id, goal_id },
                    None => CoreError::not_found("goal", goal_id),
                });
            }

            for id in &plan.delete {
                self.conn().execute(
                    "DELETE FROM goals WHERE id = ?1 AND user_id = ?2",
                    params![id, user_id],
                )?;
            }
            for update in &plan.update {
                self.conn().execute(
                    "UPDATE goals SET goal_text = ?1, sort_order = ?2 WHERE id = ?3 AND user_id = ?4",
                    params![update.text, update.order, update.id, user_id],
                )?;
            }
            for insert in &plan.insert {
                self.insert_goal(user_id, &insert.text, insert.order, now)?;
            }

            info!(
                user_id,
                deleted = plan.delete.len(),
                updated = plan.update.len(),
                inserted = plan.insert.len(),
                "replaced goals"
            );
            Ok(())
        })?;

        debug!(user_id, "reloading goals after replace");
        self.list_goals(user_id)
    }
}
