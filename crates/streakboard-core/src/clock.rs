//! Date and time source.
//!
//! Everything that depends on "today" takes a [`Clock`] so tests can pin the
//! calendar instead of reading the wall clock.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock {
    /// Calendar date used to derive the current challenge day.
    fn today(&self) -> NaiveDate;

    /// Timestamp recorded on writes (`completed_at`, session expiry).
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the local calendar date and UTC wall time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one date.
///
/// `now()` is noon UTC on that date.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    date: NaiveDate,
}

impl FixedClock {
    pub fn new(date: NaiveDate) -> Self {
        Self { date }
    }

    pub fn set(&mut self, date: NaiveDate) {
        self.date = date;
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.date
    }

    fn now(&self) -> DateTime<Utc> {
        self.date
            .and_hms_opt(12, 0, 0)
            .unwrap_or_default()
            .and_utc()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }

    fn now(&self) -> DateTime<Utc> {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_clock_reports_its_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut clock = FixedClock::new(date);
        assert_eq!(clock.today(), date);
        assert_eq!(clock.now().date_naive(), date);

        let next = date.succ_opt().unwrap();
        clock.set(next);
        assert_eq!(clock.today(), next);
    }
}
