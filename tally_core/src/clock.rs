//! Injected current-date provider.
//!
//! The ledger never reads the wall clock directly; it asks a `Clock` so
//! day-rollover logic is testable without waiting for real time to pass.

use chrono::NaiveDate;
use std::cell::Cell;

/// Source of the engine's current calendar date
pub trait Clock {
    fn today(&self) -> NaiveDate;
}

/// Wall-clock dates in the local timezone
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        chrono::Local::now().date_naive()
    }
}

/// A settable clock for tests and simulated day advancement
#[derive(Clone, Debug)]
pub struct FixedClock {
    today: Cell<NaiveDate>,
}

impl FixedClock {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today: Cell::new(today),
        }
    }

    pub fn set(&self, date: NaiveDate) {
        self.today.set(date);
    }

    pub fn advance_days(&self, days: u64) {
        self.today.set(self.today.get() + chrono::Days::new(days));
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.today.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock_advances() {
        let clock = FixedClock::new(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());

        clock.advance_days(2);
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 3).unwrap());

        clock.set(NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 6, 15).unwrap());
    }
}
