//! Per-user goal lists.
//!
//! Goals are ordered by their explicit `order` field. Edits are always a
//! full replace: the caller submits the complete desired list and
//! [`plan_replace`] works out which rows to delete, update and insert.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::{Result, ValidationError};

/// Goals seeded for every new user, in display order.
pub const DEFAULT_GOALS: [&str; 5] = [
    "Two 45-minute workouts (one must be outdoors)",
    "Follow a diet plan (no cheat meals)",
    "Drink 1 gallon of water",
    "Read 10 pages of a non-fiction book",
    "Take a progress photo",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: i64,
    pub user_id: i64,
    pub text: String,
    pub order: u32,
    pub created_at: DateTime<Utc>,
}

/// One entry of a submitted goal list.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GoalDraft {
    /// Existing goal id, `None` for a new goal.
    pub id: Option<i64>,
    pub text: String,
    /// Explicit 1-based position. Falls back to the index in the submitted list.
    pub position: Option<u32>,
}

impl GoalDraft {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: None,
            text: text.into(),
            position: None,
        }
    }

    pub fn existing(id: i64, text: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            text: text.into(),
            position: None,
        }
    }

    pub fn at(mut self, position: u32) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalUpdate {
    pub id: i64,
    pub text: String,
    pub order: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalInsert {
    pub text: String,
    pub order: u32,
}

/// Row changes that turn the current goal list into the submitted one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplacePlan {
    pub delete: Vec<i64>,
    pub update: Vec<GoalUpdate>,
    pub insert: Vec<GoalInsert>,
    /// Submitted ids that are not among the user's goals.
    pub unknown: Vec<i64>,
}

impl ReplacePlan {
    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.update.is_empty() && self.insert.is_empty()
    }
}

/// Seed drafts for a new user, ordered `1..=n`.
pub fn default_drafts<S: AsRef<str>>(texts: &[S]) -> Vec<GoalDraft> {
    texts
        .iter()
        .enumerate()
        .map(|(idx, text)| GoalDraft::new(text.as_ref()).at(idx as u32 + 1))
        .collect()
}

/// Diff the user's `existing` goals against the submitted `drafts`.
///
/// Blank drafts are skipped but still occupy an index, and a blank draft
/// carrying an id keeps that goal alive unchanged.
///
/// # Errors
/// Returns a validation error for an explicit position of 0.
pub fn plan_replace(existing: &[Goal], drafts: &[GoalDraft]) -> Result<ReplacePlan> {
    let owned: HashSet<i64> = existing.iter().map(|g| g.id).collect();
    let submitted: HashSet<i64> = drafts.iter().filter_map(|d| d.id).collect();

    let mut plan = ReplacePlan {
        delete: existing
            .iter()
            .map(|g| g.id)
            .filter(|id| !submitted.contains(id))
            .collect(),
        ..ReplacePlan::default()
    };

    for (idx, draft) in drafts.iter().enumerate() {
        let order = match draft.position {
            Some(0) => {
                return Err(ValidationError::InvalidValue {
                    field: "position".into(),
                    message: "positions start at 1".into(),
                }
                .into())
            }
            Some(p) => p,
            None => idx as u32 + 1,
        };

        if let Some(id) = draft.id {
            if !owned.contains(&id) {
                plan.unknown.push(id);
                continue;
            }
        }

        let text = draft.text.trim();
        if text.is_empty() {
            continue;
        }

        match draft.id {
            Some(id) => plan.update.push(GoalUpdate {
                id,
                text: text.to_string(),
                order,
            }),
            None => plan.insert.push(GoalInsert {
                text: text.to_string(),
                order,
            }),
        }
    }

    Ok(plan)
}
