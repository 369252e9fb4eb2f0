//! # Streakboard Core Library
//!
//! Business logic for a shared 75-day habit challenge. Users keep an
//! ordered list of daily goals and check them off per day; the library
//! derives the current challenge day, each user's completion percentage and
//! trailing streak, and a scoreboard across all users.
//!
//! ## Architecture
//!
//! - **Challenge**: one shared start date; [`current_day`] is a pure
//!   function of the challenge and a date from a [`Clock`]
//! - **Goals**: per-user ordered lists, edited by full replace
//! - **Ledger**: one [`ProgressRecord`] per `(user, goal, day)`
//! - **Scoring**: pure functions over goal counts and ledger slices
//! - **Storage**: SQLite via `rusqlite`, TOML configuration
//! - **Tracker**: boundary operations used by the CLI
//!
//! ## Key Components
//!
//! - [`Tracker`]: register, login, dashboard, toggle, scoreboard
//! - [`Database`]: persistence and transactional writes
//! - [`Config`]: application configuration management

pub mod auth;
pub mod challenge;
pub mod clock;
pub mod error;
pub mod goals;
pub mod ledger;
pub mod scoring;
pub mod storage;
pub mod tracker;

pub use auth::{Session, User};
pub use challenge::{current_day, Challenge, CHALLENGE_DAYS};
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::{ConfigError, CoreError, DatabaseError, Result, ValidationError};
pub use goals::{Goal, GoalDraft, DEFAULT_GOALS};
pub use ledger::{ProgressRecord, ToggleOutcome};
pub use scoring::{Completion, ScoreEntry};
pub use storage::{Config, Database};
pub use tracker::{ChallengeStatus, Dashboard, GoalStatus, Scoreboard, Tracker};
