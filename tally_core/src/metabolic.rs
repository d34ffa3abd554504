//! Basal metabolic rate and total daily energy expenditure.
//!
//! BMR uses the Mifflin-St Jeor equation, applied uniformly across every
//! code path so a day's locked goal is reproducible wherever it is
//! recomputed. The activity multiplier table is the standard five-level
//! ladder from sedentary to extra active.

use crate::{ActivityLevel, Sex};
use chrono::{Datelike, NaiveDate};

/// Basal Metabolic Rate in kcal/day (Mifflin-St Jeor)
///
/// `10*weight + 6.25*height - 5*age`, offset +5 for male and -161 for
/// female. Weight in kilograms, height in centimeters.
pub fn compute_bmr(weight_kg: f64, height_cm: f64, age: u32, sex: Sex) -> f64 {
    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * f64::from(age);
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Total Daily Energy Expenditure: BMR scaled by the activity multiplier
pub fn apply_activity(bmr: f64, activity: ActivityLevel) -> f64 {
    bmr * activity.multiplier()
}

/// Calendar age in whole years on the given date
///
/// Drives the birthday-triggered age refresh at day-open. Dates before
/// the birth date report 0.
pub fn age_on(birth_date: NaiveDate, date: NaiveDate) -> u32 {
    if date < birth_date {
        return 0;
    }
    let mut age = date.year() - birth_date.year();
    if (date.month(), date.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age.max(0) as u32
}
