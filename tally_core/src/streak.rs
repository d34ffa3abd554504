//! Streak computation over closed-day history.
//!
//! A pass streak counts consecutive closed days under their calorie
//! goal; an activity streak counts consecutive days with at least one
//! workout entry. Any failing day or missing date breaks a streak.

use crate::DailyRecord;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

/// Consecutive passing days strictly before `as_of`
///
/// Walks backward from the day immediately prior, stopping at the first
/// failing day or missing record.
pub fn current_streak(history: &[DailyRecord], as_of: NaiveDate) -> u32 {
    walk_back(history, as_of, |r| r.pass_fail)
}

/// Highest pass streak anywhere in the closed history
pub fn highest_streak(history: &[DailyRecord]) -> u32 {
    scan_max(history, |r| r.pass_fail)
}

/// Consecutive workout days strictly before `as_of`
pub fn current_activity_streak(history: &[DailyRecord], as_of: NaiveDate) -> u32 {
    walk_back(history, as_of, |r| r.has_workout())
}

/// Highest workout streak anywhere in the closed history
pub fn highest_activity_streak(history: &[DailyRecord]) -> u32 {
    scan_max(history, |r| r.has_workout())
}

/// Backward walk from `as_of - 1`, counting while `qualifies` holds
fn walk_back(
    history: &[DailyRecord],
    as_of: NaiveDate,
    qualifies: impl Fn(&DailyRecord) -> bool,
) -> u32 {
    let by_date: HashMap<NaiveDate, &DailyRecord> = history
        .iter()
        .filter(|r| r.closed)
        .map(|r| (r.date, r))
        .collect();

    let mut streak = 0;
    let mut date = as_of - Days::new(1);

    while let Some(record) = by_date.get(&date) {
        if !qualifies(record) {
            break;
        }
        streak += 1;
        date = date - Days::new(1);
    }

    streak
}

/// Chronological scan tracking the longest run, resetting on fail or gap
fn scan_max(history: &[DailyRecord], qualifies: impl Fn(&DailyRecord) -> bool) -> u32 {
    let mut closed: Vec<&DailyRecord> = history.iter().filter(|r| r.closed).collect();
    closed.sort_by_key(|r| r.date);

    let mut best = 0;
    let mut run = 0;
    let mut prev_date: Option<NaiveDate> = None;

    for record in closed {
        let contiguous = prev_date
            .map(|p| p + Days::new(1) == record.date)
            .unwrap_or(true);
        if !contiguous {
            run = 0;
        }

        if qualifies(record) {
            run += 1;
            best = best.max(run);
        } else {
            run = 0;
        }

        prev_date = Some(record.date);
    }

    best
}
