//! Daily calorie goal resolution.
//!
//! Turns the profile's goal strategy and the day's TDEE into the calorie
//! target that gets locked onto the opening record. Rate math uses
//! 7700 kcal per kg (metric profiles) or 3500 kcal per lb (imperial
//! profiles); a non-positive result clamps to the configured safety
//! floor and raises a data-quality flag instead of propagating silently.

use crate::{units, DataQuality, GoalStrategy, Profile};
use chrono::NaiveDate;

pub const KCAL_PER_KG: f64 = 7700.0;
pub const KCAL_PER_LB: f64 = 3500.0;

/// A resolved daily goal plus any data-quality condition hit on the way
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GoalResolution {
    pub kcal: u32,
    pub flag: Option<DataQuality>,
}

/// Resolve the day's calorie target from TDEE and the goal strategy
///
/// `today` anchors the days-remaining math for date-targeted goals.
pub fn resolve_daily_goal(
    tdee: f64,
    strategy: &GoalStrategy,
    profile: &Profile,
    today: NaiveDate,
    safety_floor_kcal: u32,
) -> GoalResolution {
    let kcal_per_unit = if profile.use_metric {
        KCAL_PER_KG
    } else {
        KCAL_PER_LB
    };

    let raw = match strategy {
        GoalStrategy::Maintain | GoalStrategy::TdeeOnly => tdee,

        GoalStrategy::RatePerWeek { rate_per_week } => {
            let daily_delta = rate_per_week * kcal_per_unit / 7.0;
            tdee + daily_delta
        }

        GoalStrategy::RateToTargetByDate {
            target_weight_kg,
            target_date,
        } => {
            let days_until_target = (*target_date - today).num_days();
            if days_until_target <= 0 {
                tracing::info!(
                    "Target date {} has passed, falling back to maintenance",
                    target_date
                );
                tdee
            } else {
                let remaining_delta = units::kg_to_display(
                    target_weight_kg - profile.current_weight_kg,
                    profile.use_metric,
                );
                let daily_delta =
                    remaining_delta * kcal_per_unit / days_until_target.max(1) as f64;
                tdee + daily_delta
            }
        }

        GoalStrategy::FixedCalories { kcal } => f64::from(*kcal),
    };

    let rounded = raw.round() as i64;
    if rounded <= 0 {
        tracing::warn!(
            "Resolved goal {} kcal is non-positive, clamping to floor {}",
            rounded,
            safety_floor_kcal
        );
        GoalResolution {
            kcal: safety_floor_kcal,
            flag: Some(DataQuality::GoalClamped),
        }
    } else {
        GoalResolution {
            kcal: rounded as u32,
            flag: None,
        }
    }
}

/// Human-readable summary of the active goal, for display surfaces
pub fn describe(strategy: &GoalStrategy, profile: &Profile) -> String {
    let unit = if profile.use_metric { "kg" } else { "lbs" };

    match strategy {
        GoalStrategy::Maintain => "Maintain current weight".to_string(),
        GoalStrategy::TdeeOnly => "Track against daily energy expenditure".to_string(),
        GoalStrategy::FixedCalories { kcal } => format!("Keep daily calories to {}", kcal),
        GoalStrategy::RatePerWeek { rate_per_week } => {
            let action = if *rate_per_week < 0.0 { "Lose" } else { "Gain" };
            format!("{} {:.1} {} per week", action, rate_per_week.abs(), unit)
        }
        GoalStrategy::RateToTargetByDate {
            target_weight_kg,
            target_date,
        } => {
            let delta = units::kg_to_display(
                (target_weight_kg - profile.current_weight_kg).abs(),
                profile.use_metric,
            );
            let action = if *target_weight_kg < profile.current_weight_kg {
                "Lose"
            } else {
                "Gain"
            };
            format!("{} {:.1} {} by {}", action, delta, unit, target_date)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ActivityLevel, Sex};

    fn test_profile(use_metric: bool) -> Profile {
        Profile::new(
            "Sam",
            Sex::Male,
            NaiveDate::from_ymd_opt(1995, 1, 1).unwrap(),
            80.0,
            180.0,
            ActivityLevel::Sedentary,
            use_metric,
            GoalStrategy::Maintain,
            NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()
    }

    #[test]
    fn test_maintain_equals_tdee() {
        let profile = test_profile(true);
        let goal = resolve_daily_goal(2136.0, &GoalStrategy::Maintain, &profile, today(), 1200);
        assert_eq!(goal.kcal, 2136);
        assert!(goal.flag.is_none());
    }

    #[test]
    fn test_rate_per_week_metric() {
        // -0.5 kg/week: 7700 / 7 * 0.5 = 550 kcal daily deficit
        let profile = test_profile(true);
        let strategy = GoalStrategy::RatePerWeek {
            rate_per_week: -0.5,
        };
        let goal = resolve_daily_goal(2136.0, &strategy, &profile, today(), 1200);
        assert_eq!(goal.kcal, 1586);
    }

    #[test]
    fn test_rate_per_week_imperial_gain() {
        // +1 lb/week: 3500 / 7 = 500 kcal daily surplus
        let profile = test_profile(false);
        let strategy = GoalStrategy::RatePerWeek { rate_per_week: 1.0 };
        let goal = resolve_daily_goal(2136.0, &strategy, &profile, today(), 1200);
        assert_eq!(goal.kcal, 2636);
    }

    #[test]
    fn test_target_by_date() {
        // Lose 7 kg in 70 days: 7700 * 7 / 70 = 770 kcal daily deficit
        let profile = test_profile(true);
        let strategy = GoalStrategy::RateToTargetByDate {
            target_weight_kg: 73.0,
            target_date: NaiveDate::from_ymd_opt(2025, 5, 10).unwrap(),
        };
        let goal = resolve_daily_goal(2136.0, &strategy, &profile, today(), 1200);
        assert_eq!(goal.kcal, 1366);
    }

    #[test]
    fn test_target_date_passed_falls_back_to_maintain() {
        let profile = test_profile(true);
        let strategy = GoalStrategy::RateToTargetByDate {
            target_weight_kg: 73.0,
            target_date: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        };
        let goal = resolve_daily_goal(2136.0, &strategy, &profile, today(), 1200);
        assert_eq!(goal.kcal, 2136);

        // Target date equal to today also maintains
        let strategy = GoalStrategy::RateToTargetByDate {
            target_weight_kg: 73.0,
            target_date: today(),
        };
        let goal = resolve_daily_goal(2136.0, &strategy, &profile, today(), 1200);
        assert_eq!(goal.kcal, 2136);
    }

    #[test]
    fn test_fixed_calories_ignores_tdee() {
        let profile = test_profile(true);
        let strategy = GoalStrategy::FixedCalories { kcal: 1800 };
        let goal = resolve_daily_goal(9999.0, &strategy, &profile, today(), 1200);
        assert_eq!(goal.kcal, 1800);
    }

    #[test]
    fn test_degenerate_goal_clamps_to_floor() {
        // Aggressive rate that would push the goal below zero
        let profile = test_profile(true);
        let strategy = GoalStrategy::RatePerWeek {
            rate_per_week: -3.0,
        };
        let goal = resolve_daily_goal(2136.0, &strategy, &profile, today(), 1200);
        assert_eq!(goal.kcal, 1200);
        assert_eq!(goal.flag, Some(DataQuality::GoalClamped));
    }

    #[test]
    fn test_describe_rate_goal() {
        let profile = test_profile(true);
        let strategy = GoalStrategy::RatePerWeek {
            rate_per_week: -0.5,
        };
        assert_eq!(describe(&strategy, &profile), "Lose 0.5 kg per week");
    }
}
