//! Per-day completion records.
//!
//! A record exists for each `(user, goal, day)` that was ever checked. A
//! missing record means "not completed".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub user_id: i64,
    pub goal_id: i64,
    pub day_number: u32,
    pub completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    /// Record created by the first check-off of a goal on a day.
    pub fn first_check(user_id: i64, goal_id: i64, day_number: u32, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            goal_id,
            day_number,
            completed: true,
            completed_at: Some(now),
        }
    }

    /// The record after one toggle at `now`.
    pub fn toggled(&self, now: DateTime<Utc>) -> Self {
        let completed = !self.completed;
        Self {
            completed,
            completed_at: completed.then_some(now),
            ..self.clone()
        }
    }
}

/// Result of a toggle, as shown to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToggleOutcome {
    pub goal_id: i64,
    pub day_number: u32,
    pub completed: bool,
}

impl From<&ProgressRecord> for ToggleOutcome {
    fn from(record: &ProgressRecord) -> Self {
        Self {
            goal_id: record.goal_id,
            day_number: record.day_number,
            completed: record.completed,
        }
    }
}

/// Goal id to completion state for one day.
pub fn day_map(records: &[ProgressRecord], day: u32) -> HashMap<i64, bool> {
    records
        .iter()
        .filter(|r| r.day_number == day)
        .map(|r| (r.goal_id, r.completed))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn first_check_is_completed_now() {
        let now = Utc::now();
        let rec = ProgressRecord::first_check(1, 2, 3, now);
        assert!(rec.completed);
        assert_eq!(rec.completed_at, Some(now));
    }

    #[test]
    fn double_toggle_restores_state_and_clears_timestamp() {
        let now = Utc::now();
        let rec = ProgressRecord::first_check(1, 2, 3, now);
        let off = rec.toggled(now + Duration::minutes(1));
        assert!(!off.completed);
        assert_eq!(off.completed_at, None);

        let later = now + Duration::minutes(2);
        let on = off.toggled(later);
        assert!(on.completed);
        assert_eq!(on.completed_at, Some(later));
        assert_eq!(on.toggled(later).completed_at, None);
    }

    #[test]
    fn day_map_filters_by_day() {
        let now = Utc::now();
        let records = vec![
            ProgressRecord::first_check(1, 10, 1, now),
            ProgressRecord::first_check(1, 11, 1, now).toggled(now),
            ProgressRecord::first_check(1, 10, 2, now),
        ];
        let map = day_map(&records, 1);
        assert_eq!(map.len(), 2);
        assert_eq!(map[&10], true);
        assert_eq!(map[&11], false);
    }
}
