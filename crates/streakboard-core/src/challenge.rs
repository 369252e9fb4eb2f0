//! Challenge window and current-day derivation.
//!
//! There is exactly one challenge. Its start date anchors a fixed window of
//! [`CHALLENGE_DAYS`] days; day 1 is the start date itself.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Length of the challenge window in days.
pub const CHALLENGE_DAYS: u32 = 75;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    pub start_date: NaiveDate,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Challenge {
    pub fn new(start_date: NaiveDate, created_at: DateTime<Utc>) -> Self {
        Self {
            start_date,
            is_active: true,
            created_at,
        }
    }

    /// Last calendar date inside the window.
    pub fn end_date(&self) -> NaiveDate {
        self.start_date + Duration::days(i64::from(CHALLENGE_DAYS) - 1)
    }

    pub fn current_day(&self, today: NaiveDate) -> u32 {
        current_day(self, today)
    }
}

/// 1-based day of the challenge on `today`, clamped to `[0, CHALLENGE_DAYS]`.
///
/// Returns 0 for an inactive challenge or one that has not started yet.
pub fn current_day(challenge: &Challenge, today: NaiveDate) -> u32 {
    if !challenge.is_active {
        return 0;
    }

    let delta = (today - challenge.start_date).num_days() + 1;
    if delta < 1 {
        0
    } else if delta > i64::from(CHALLENGE_DAYS) {
        CHALLENGE_DAYS
    } else {
        delta as u32
    }
}

/// Days left after `current_day`, not counting it.
pub fn days_remaining(current_day: u32) -> u32 {
    CHALLENGE_DAYS.saturating_sub(current_day)
}

/// Accepts day numbers inside the window.
///
/// # Errors
/// Returns [`CoreError::InvalidDay`] for anything outside `[1, CHALLENGE_DAYS]`.
pub fn validate_day(day: i64) -> Result<u32> {
    if (1..=i64::from(CHALLENGE_DAYS)).contains(&day) {
        Ok(day as u32)
    } else {
        Err(CoreError::InvalidDay(day))
    }
}

/// Clamp a requested dashboard day into the window.
pub fn clamp_day(day: i64) -> u32 {
    day.clamp(1, i64::from(CHALLENGE_DAYS)) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn challenge(start: NaiveDate) -> Challenge {
        Challenge::new(start, Utc::now())
    }

    #[test]
    fn start_date_is_day_one() {
        let c = challenge(date(2024, 1, 1));
        assert_eq!(current_day(&c, date(2024, 1, 1)), 1);
        assert_eq!(current_day(&c, date(2024, 1, 2)), 2);
    }

    #[test]
    fn before_start_is_day_zero() {
        let c = challenge(date(2024, 1, 1));
        assert_eq!(current_day(&c, date(2023, 12, 31)), 0);
    }

    #[test]
    fn clamps_after_window() {
        let c = challenge(date(2024, 1, 1));
        assert_eq!(current_day(&c, date(2024, 3, 15)), 75);
        assert_eq!(current_day(&c, c.start_date + Duration::days(80)), 75);
        assert_eq!(current_day(&c, c.end_date()), 75);
        assert_eq!(current_day(&c, c.end_date() - Duration::days(1)), 74);
    }

    #[test]
    fn inactive_is_day_zero() {
        let mut c = challenge(date(2024, 1, 1));
        c.is_active = false;
        assert_eq!(current_day(&c, date(2024, 1, 10)), 0);
    }

    #[test]
    fn validate_day_bounds() {
        assert!(matches!(validate_day(0), Err(CoreError::InvalidDay(0))));
        assert!(matches!(validate_day(76), Err(CoreError::InvalidDay(76))));
        assert_eq!(validate_day(1).unwrap(), 1);
        assert_eq!(validate_day(75).unwrap(), 75);
    }

    #[test]
    fn clamp_and_remaining() {
        assert_eq!(clamp_day(-3), 1);
        assert_eq!(clamp_day(200), 75);
        assert_eq!(days_remaining(75), 0);
        assert_eq!(days_remaining(0), 75);
    }

    proptest! {
        #[test]
        fn never_leaves_window(offset in -2000i64..2000) {
            let c = challenge(date(2024, 1, 1));
            let day = current_day(&c, c.start_date + Duration::days(offset));
            prop_assert!(day <= CHALLENGE_DAYS);
        }

        #[test]
        fn before_start_always_zero(offset in 1i64..5000) {
            let c = challenge(date(2024, 6, 1));
            prop_assert_eq!(current_day(&c, c.start_date - Duration::days(offset)), 0);
        }

        #[test]
        fn past_window_always_full(extra in 0i64..5000) {
            let c = challenge(date(2024, 6, 1));
            let today = c.start_date + Duration::days(75 + extra);
            prop_assert_eq!(current_day(&c, today), 75);
        }
    }
}
