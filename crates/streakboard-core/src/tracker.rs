//! Boundary operations.
//!
//! [`Tracker`] is what a front end talks to: it reads the challenge once per
//! call, derives the current day from its [`Clock`], and hands the relevant
//! ledger slice to the scoring functions. It never caches scores.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::auth::{hash_password, verify_password, Session, User};
use crate::challenge::{self, Challenge};
use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, Result, ValidationError};
use crate::goals::{default_drafts, Goal, GoalDraft};
use crate::ledger::{day_map, ToggleOutcome};
use crate::scoring::{self, Completion, ScoreEntry};
use crate::storage::{Config, Database};

/// Challenge plus the values derived from it for today.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChallengeStatus {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_active: bool,
    pub current_day: u32,
    pub days_remaining: u32,
}

impl ChallengeStatus {
    fn new(challenge: &Challenge, today: NaiveDate) -> Self {
        let current_day = challenge.current_day(today);
        Self {
            start_date: challenge.start_date,
            end_date: challenge.end_date(),
            is_active: challenge.is_active,
            current_day,
            days_remaining: challenge::days_remaining(current_day),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalStatus {
    pub id: i64,
    pub text: String,
    pub order: u32,
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
    pub username: String,
    pub challenge: ChallengeStatus,
    pub current_day: u32,
    pub selected_day: u32,
    pub goals: Vec<GoalStatus>,
    pub completion: Completion,
    pub streak: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scoreboard {
    pub current_day: u32,
    pub entries: Vec<ScoreEntry>,
}

pub struct Tracker<C: Clock = SystemClock> {
    db: Database,
    clock: C,
    config: Config,
}

impl<C: Clock> Tracker<C> {
    pub fn new(db: Database, clock: C, config: Config) -> Self {
        Self { db, clock, config }
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// The challenge, created on first use to start today.
    pub fn challenge(&self) -> Result<Challenge> {
        self.db
            .ensure_challenge(self.clock.today(), self.clock.now())
    }

    pub fn challenge_status(&self) -> Result<ChallengeStatus> {
        Ok(ChallengeStatus::new(&self.challenge()?, self.clock.today()))
    }

    pub fn current_day(&self) -> Result<u32> {
        Ok(self.challenge()?.current_day(self.clock.today()))
    }

    // === Accounts ===

    /// Create a user and seed the configured default goals.
    ///
    /// # Errors
    /// [`CoreError::DuplicateUsername`] if the name is taken.
    pub fn register(&self, username: &str, password: &str) -> Result<User> {
        let username = username.trim();
        if username.is_empty() {
            return Err(ValidationError::Empty("username").into());
        }
        if password.is_empty() {
            return Err(ValidationError::Empty("password").into());
        }
        if self.db.user_by_username(username)?.is_some() {
            return Err(CoreError::DuplicateUsername(username.to_string()));
        }

        let password_hash = hash_password(password)?;
        let now = self.clock.now();
        let user = self.db.write_tx(|| {
            let user = self.db.insert_user(username, &password_hash, now)?;
            for draft in default_drafts(&self.config.goals.defaults) {
                let text = draft.text.trim();
                if text.is_empty() {
                    continue;
                }
                let order = draft.position.unwrap_or(1);
                self.db.insert_goal(user.id, text, order, now)?;
            }
            Ok(user)
        })?;

        info!(user_id = user.id, username, "registered user");
        Ok(user)
    }

    /// Verify credentials and open a session.
    pub fn login(&self, username: &str, password: &str) -> Result<Session> {
        let user = match self.db.user_by_username(username.trim())? {
            Some(user) if verify_password(password, &user.password_hash)? => user,
            _ => {
                warn!(username, "failed login");
                return Err(CoreError::InvalidCredentials);
            }
        };

        let now = self.clock.now();
        self.db.purge_expired_sessions(now)?;
        let session = Session::issue(user.id, now, self.config.session.lifetime_days);
        self.db.insert_session(&session)?;
        info!(user_id = user.id, "logged in");
        Ok(session)
    }

    /// Returns whether a live session was closed.
    pub fn logout(&self, token: &str) -> Result<bool> {
        self.db.delete_session(token)
    }

    /// Resolve a session token to its user.
    ///
    /// # Errors
    /// [`CoreError::NotAuthenticated`] for unknown or expired tokens.
    pub fn authenticate(&self, token: &str) -> Result<User> {
        let session = self
            .db
            .session(token)?
            .ok_or(CoreError::NotAuthenticated)?;
        if session.is_expired(self.clock.now()) {
            self.db.delete_session(token)?;
            return Err(CoreError::NotAuthenticated);
        }
        self.db
            .user(session.user_id)?
            .ok_or(CoreError::NotAuthenticated)
    }

    /// Delete a user together with their goals, progress and sessions.
    pub fn delete_account(&self, user_id: i64) -> Result<()> {
        self.db.write_tx(|| self.db.delete_user(user_id))
    }

    // === Goals and progress ===

    pub fn goals(&self, user_id: i64) -> Result<Vec<Goal>> {
        self.db.list_goals(user_id)
    }

    pub fn replace_goals(&self, user_id: i64, drafts: &[GoalDraft]) -> Result<Vec<Goal>> {
        self.db.replace_goals(user_id, drafts, self.clock.now())
    }

    /// Toggle a goal on `day`, or on the current day when `day` is `None`.
    pub fn toggle(&self, user_id: i64, goal_id: i64, day: Option<i64>) -> Result<ToggleOutcome> {
        let day = match day {
            Some(day) => day,
            None => i64::from(self.current_day()?),
        };
        let record = self
            .db
            .toggle_progress(user_id, goal_id, day, self.clock.now())?;
        Ok(ToggleOutcome::from(&record))
    }

    /// Goals with their state on the selected day, plus overall scores.
    ///
    /// The selected day defaults to the current day and is clamped into the
    /// window; scores always use the current day.
    pub fn dashboard(&self, user_id: i64, day: Option<i64>) -> Result<Dashboard> {
        let user = self
            .db
            .user(user_id)?
            .ok_or_else(|| CoreError::not_found("user", user_id))?;
        let status = self.challenge_status()?;
        let current_day = status.current_day;
        let selected_day = challenge::clamp_day(day.unwrap_or(i64::from(current_day)));

        let goals = self.db.list_goals(user_id)?;
        let records = self.db.list_progress(user_id)?;
        let states = day_map(&records, selected_day);
        let goal_count = goals.len() as u32;

        Ok(Dashboard {
            username: user.username,
            challenge: status,
            current_day,
            selected_day,
            goals: goals
                .into_iter()
                .map(|g| GoalStatus {
                    completed: states.get(&g.id).copied().unwrap_or(false),
                    id: g.id,
                    text: g.text,
                    order: g.order,
                })
                .collect(),
            completion: scoring::completion(goal_count, &records, current_day),
            streak: scoring::streak(goal_count, &records, current_day),
        })
    }

    /// Every user scored at the current day, best first.
    pub fn scoreboard(&self) -> Result<Scoreboard> {
        let current_day = self.current_day()?;
        let mut entries = Vec::new();
        for user in self.db.list_users()? {
            let goal_count = self.db.goal_count(user.id)?;
            let records = self.db.list_progress(user.id)?;
            entries.push(scoring::score_user(
                user.id,
                &user.username,
                goal_count,
                &records,
                current_day,
            ));
        }
        Ok(Scoreboard {
            current_day,
            entries: scoring::rank(entries),
        })
    }

    // === Challenge settings ===

    /// Move the start date; scores follow on the next read.
    pub fn set_start_date(&self, start_date: NaiveDate) -> Result<ChallengeStatus> {
        self.challenge()?;
        let challenge = self.db.set_challenge_start(start_date)?;
        Ok(ChallengeStatus::new(&challenge, self.clock.today()))
    }

    pub fn set_active(&self, is_active: bool) -> Result<ChallengeStatus> {
        self.challenge()?;
        let challenge = self.db.set_challenge_active(is_active)?;
        Ok(ChallengeStatus::new(&challenge, self.clock.today()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn tracker(today: NaiveDate) -> Tracker<FixedClock> {
        let db = Database::open_in_memory().unwrap();
        Tracker::new(db, FixedClock::new(today), Config::default())
    }

    #[test]
    fn register_seeds_default_goals() {
        let t = tracker(date(2024, 1, 1));
        let user = t.register("alex", "pw").unwrap();
        let goals = t.goals(user.id).unwrap();
        assert_eq!(goals.len(), 5);
        assert_eq!(goals[0].text, "Two 45-minute workouts (one must be outdoors)");
        assert_eq!(goals.iter().map(|g| g.order).collect::<Vec<_>>(), vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn register_validates_and_rejects_duplicates() {
        let t = tracker(date(2024, 1, 1));
        assert!(matches!(t.register("  ", "pw"), Err(CoreError::Validation(_))));
        assert!(matches!(t.register("alex", ""), Err(CoreError::Validation(_))));
        t.register("alex", "pw").unwrap();
        assert!(matches!(
            t.register("alex", "pw2"),
            Err(CoreError::DuplicateUsername(_))
        ));
    }

    #[test]
    fn login_and_authenticate() {
        let t = tracker(date(2024, 1, 1));
        let user = t.register("alex", "pw").unwrap();
        assert!(matches!(t.login("alex", "nope"), Err(CoreError::InvalidCredentials)));
        assert!(matches!(t.login("ghost", "pw"), Err(CoreError::InvalidCredentials)));

        let session = t.login("alex", "pw").unwrap();
        assert_eq!(t.authenticate(&session.token).unwrap().id, user.id);
        assert!(t.logout(&session.token).unwrap());
        assert!(matches!(
            t.authenticate(&session.token),
            Err(CoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn sessions_expire_after_lifetime() {
        let mut t = tracker(date(2024, 1, 1));
        t.register("alex", "pw").unwrap();
        let session = t.login("alex", "pw").unwrap();
        t.clock_mut().set(date(2024, 1, 8));
        assert!(matches!(
            t.authenticate(&session.token),
            Err(CoreError::NotAuthenticated)
        ));
    }

    #[test]
    fn toggle_defaults_to_current_day() {
        let t = tracker(date(2024, 1, 3));
        t.set_start_date(date(2024, 1, 1)).unwrap();
        let user = t.register("alex", "pw").unwrap();
        let goal = t.goals(user.id).unwrap()[0].id;

        let outcome = t.toggle(user.id, goal, None).unwrap();
        assert_eq!(outcome.day_number, 3);
        assert!(outcome.completed);
    }

    #[test]
    fn toggle_before_start_is_invalid_day() {
        let t = tracker(date(2024, 1, 1));
        t.set_start_date(date(2024, 2, 1)).unwrap();
        let user = t.register("alex", "pw").unwrap();
        let goal = t.goals(user.id).unwrap()[0].id;
        assert!(matches!(
            t.toggle(user.id, goal, None),
            Err(CoreError::InvalidDay(0))
        ));
    }

    #[test]
    fn dashboard_clamps_selected_day() {
        let t = tracker(date(2024, 1, 1));
        let user = t.register("alex", "pw").unwrap();
        assert_eq!(t.dashboard(user.id, Some(200)).unwrap().selected_day, 75);
        assert_eq!(t.dashboard(user.id, Some(-4)).unwrap().selected_day, 1);
        assert_eq!(t.dashboard(user.id, None).unwrap().selected_day, 1);
    }

    #[test]
    fn moving_start_date_rescores() {
        let t = tracker(date(2024, 1, 10));
        let status = t.set_start_date(date(2024, 1, 1)).unwrap();
        assert_eq!(status.current_day, 10);
        assert_eq!(status.days_remaining, 65);
        assert_eq!(t.set_start_date(date(2024, 1, 11)).unwrap().current_day, 0);
        assert_eq!(t.set_active(false).unwrap().current_day, 0);
    }

    #[test]
    fn delete_account_cascades() {
        let t = tracker(date(2024, 1, 1));
        let user = t.register("alex", "pw").unwrap();
        let goal = t.goals(user.id).unwrap()[0].id;
        t.toggle(user.id, goal, Some(1)).unwrap();

        t.delete_account(user.id).unwrap();
        assert!(t.goals(user.id).unwrap().is_empty());
        assert!(t.db().list_progress(user.id).unwrap().is_empty());
        assert!(matches!(
            t.delete_account(user.id),
            Err(CoreError::NotFound { .. })
        ));
    }
}
