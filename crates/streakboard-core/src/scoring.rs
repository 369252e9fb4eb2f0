//! Completion percentage, streaks and the scoreboard ranking.
//!
//! Every function takes `current_day` as a parameter and reads only the
//! records passed in, so scores are recomputed from the ledger on demand
//! and never go stale.
//!
//! ```text
//! total_possible  = goal_count * min(current_day, 75)
//! completed_count = |{ r : r.completed && r.day_number <= current_day }|
//! percentage      = completed_count / total_possible * 100   (0 if total_possible == 0)
//! ```

use serde::{Deserialize, Serialize};

use crate::challenge::CHALLENGE_DAYS;
use crate::ledger::ProgressRecord;

/// Aggregate completion for one user.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Completion {
    pub completed_count: u32,
    pub total_possible: u32,
    pub percentage: f64,
}

/// One scoreboard row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreEntry {
    pub user_id: i64,
    pub username: String,
    pub goal_count: u32,
    pub completed_count: u32,
    pub total_possible: u32,
    pub percentage: f64,
    pub streak: u32,
}

pub fn completion(goal_count: u32, records: &[ProgressRecord], current_day: u32) -> Completion {
    let total_possible = goal_count * current_day.min(CHALLENGE_DAYS);
    let completed_count = records
        .iter()
        .filter(|r| r.completed && r.day_number <= current_day)
        .count() as u32;

    let percentage = if total_possible == 0 {
        0.0
    } else {
        (f64::from(completed_count) / f64::from(total_possible) * 100.0).clamp(0.0, 100.0)
    };

    Completion {
        completed_count,
        total_possible,
        percentage,
    }
}

/// Consecutive fully completed days ending at `current_day`.
///
/// A day is complete when its completed records number `goal_count`, so a
/// user without goals completes every day.
pub fn streak(goal_count: u32, records: &[ProgressRecord], current_day: u32) -> u32 {
    let mut per_day = [0u32; CHALLENGE_DAYS as usize + 1];
    for r in records.iter().filter(|r| r.completed) {
        if let Some(slot) = per_day.get_mut(r.day_number as usize) {
            *slot += 1;
        }
    }

    let mut streak = 0;
    for day in (1..=current_day.min(CHALLENGE_DAYS)).rev() {
        if per_day[day as usize] == goal_count {
            streak += 1;
        } else {
            break;
        }
    }
    streak
}

/// Score one user.
pub fn score_user(
    user_id: i64,
    username: &str,
    goal_count: u32,
    records: &[ProgressRecord],
    current_day: u32,
) -> ScoreEntry {
    let c = completion(goal_count, records, current_day);
    ScoreEntry {
        user_id,
        username: username.to_string(),
        goal_count,
        completed_count: c.completed_count,
        total_possible: c.total_possible,
        percentage: c.percentage,
        streak: streak(goal_count, records, current_day),
    }
}

/// Sort descending by percentage.
///
/// The sort is stable, so ties keep the order they were passed in.
pub fn rank(mut entries: Vec<ScoreEntry>) -> Vec<ScoreEntry> {
    entries.sort_by(|a, b| b.percentage.total_cmp(&a.percentage));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use proptest::prelude::*;

    fn done(goal_id: i64, day: u32) -> ProgressRecord {
        ProgressRecord::first_check(1, goal_id, day, Utc::now())
    }

    fn undone(goal_id: i64, day: u32) -> ProgressRecord {
        done(goal_id, day).toggled(Utc::now())
    }

    fn full_day(day: u32, goals: i64) -> Vec<ProgressRecord> {
        (1..=goals).map(|g| done(g, day)).collect()
    }

    fn entry(user_id: i64, percentage: f64) -> ScoreEntry {
        ScoreEntry {
            user_id,
            username: format!("user{user_id}"),
            goal_count: 5,
            completed_count: 0,
            total_possible: 0,
            percentage,
            streak: 0,
        }
    }

    #[test]
    fn no_goals_is_zero_percent() {
        let c = completion(0, &[], 10);
        assert_eq!(c.total_possible, 0);
        assert_eq!(c.percentage, 0.0);
    }

    #[test]
    fn day_zero_is_zero_percent() {
        let c = completion(5, &full_day(1, 5), 0);
        assert_eq!(c.total_possible, 0);
        assert_eq!(c.completed_count, 0);
        assert_eq!(c.percentage, 0.0);
    }

    #[test]
    fn first_day_full_then_empty_second_day() {
        let records = full_day(1, 5);

        let day1 = completion(5, &records, 1);
        assert_eq!(day1.completed_count, 5);
        assert_eq!(day1.total_possible, 5);
        assert_eq!(day1.percentage, 100.0);
        assert_eq!(streak(5, &records, 1), 1);

        let day2 = completion(5, &records, 2);
        assert_eq!(day2.total_possible, 10);
        assert_eq!(day2.completed_count, 5);
        assert_eq!(day2.percentage, 50.0);
        assert_eq!(streak(5, &records, 2), 0);
    }

    #[test]
    fn future_and_unchecked_records_do_not_count() {
        let records = vec![done(1, 1), undone(2, 1), done(1, 3)];
        let c = completion(2, &records, 2);
        assert_eq!(c.completed_count, 1);
        assert_eq!(c.total_possible, 4);
        assert_eq!(c.percentage, 25.0);
    }

    #[test]
    fn streak_walks_back_until_gap() {
        let mut records = Vec::new();
        records.extend(full_day(1, 3));
        records.push(done(1, 2));
        records.extend(full_day(3, 3));
        records.extend(full_day(4, 3));
        assert_eq!(streak(3, &records, 4), 2);
        assert_eq!(streak(3, &records, 1), 1);
        assert_eq!(streak(3, &records, 2), 0);
    }

    #[test]
    fn unchecked_record_breaks_streak() {
        let mut records = full_day(1, 2);
        records.push(done(1, 2));
        records.push(undone(2, 2));
        assert_eq!(streak(2, &records, 2), 0);
    }

    #[test]
    fn streak_zero_on_day_zero() {
        assert_eq!(streak(5, &full_day(1, 5), 0), 0);
        assert_eq!(streak(0, &[], 0), 0);
    }

    #[test]
    fn user_without_goals_completes_every_day() {
        assert_eq!(streak(0, &[], 10), 10);
        assert_eq!(streak(0, &[], 80), 75);
        assert_eq!(completion(0, &[], 10).percentage, 0.0);
    }

    #[test]
    fn rank_is_descending_and_stable() {
        let ranked = rank(vec![
            entry(1, 40.0),
            entry(2, 90.0),
            entry(3, 40.0),
            entry(4, 100.0),
        ]);
        let ids: Vec<_> = ranked.iter().map(|e| e.user_id).collect();
        assert_eq!(ids, vec![4, 2, 1, 3]);
    }

    #[test]
    fn score_user_combines_metrics() {
        let records = full_day(1, 2);
        let e = score_user(7, "sam", 2, &records, 1);
        assert_eq!(e.user_id, 7);
        assert_eq!(e.username, "sam");
        assert_eq!(e.percentage, 100.0);
        assert_eq!(e.streak, 1);
    }

    proptest! {
        #[test]
        fn percentage_stays_in_bounds(
            goals in 0u32..8,
            current_day in 0u32..=75,
            days in proptest::collection::vec((1u32..=75, 1i64..8, any::<bool>()), 0..200),
        ) {
            let mut seen = std::collections::HashSet::new();
            let records: Vec<_> = days
                .into_iter()
                .filter(|(day, goal, _)| i64::from(goals) >= *goal && seen.insert((*day, *goal)))
                .map(|(day, goal, completed)| if completed { done(goal, day) } else { undone(goal, day) })
                .collect();
            let c = completion(goals, &records, current_day);
            prop_assert!((0.0..=100.0).contains(&c.percentage));
            prop_assert!(c.completed_count <= c.total_possible);
        }

        #[test]
        fn incomplete_current_day_means_no_streak(current_day in 1u32..=75, goals in 2i64..6) {
            let mut records: Vec<_> = (1..current_day).flat_map(|d| full_day(d, goals)).collect();
            records.push(done(1, current_day));
            prop_assert_eq!(streak(goals as u32, &records, current_day), 0);
        }
    }
}
