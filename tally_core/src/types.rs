//! Core domain types for the Tally daily ledger.
//!
//! This module defines the fundamental types used throughout the system:
//! - User profile, goal strategies, and activity levels
//! - Daily records and their diary entries and weigh-ins
//! - Water display units
//! - Data-quality flags surfaced alongside derived values

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ============================================================================
// Profile Types
// ============================================================================

/// Biological sex, used for the BMR offset
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Sex {
    Male,
    Female,
}

/// Daily activity level, mapped to a fixed TDEE multiplier
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    Sedentary,
    Light,
    Moderate,
    Very,
    Extra,
}

impl ActivityLevel {
    /// TDEE multiplier applied on top of BMR
    pub fn multiplier(self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.20,
            ActivityLevel::Light => 1.375,
            ActivityLevel::Moderate => 1.55,
            ActivityLevel::Very => 1.725,
            ActivityLevel::Extra => 1.90,
        }
    }

    /// Build from a numeric index, clamping out-of-range values into [0, 4]
    pub fn from_index(index: i32) -> Self {
        match index.clamp(0, 4) {
            0 => ActivityLevel::Sedentary,
            1 => ActivityLevel::Light,
            2 => ActivityLevel::Moderate,
            3 => ActivityLevel::Very,
            _ => ActivityLevel::Extra,
        }
    }
}

/// The rule used to convert TDEE into a daily calorie target
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GoalStrategy {
    /// Eat at maintenance
    Maintain,
    /// Lose or gain at a weekly rate, in the profile's display mass unit
    /// (kg when metric, lb otherwise); negative rates lose weight
    RatePerWeek { rate_per_week: f64 },
    /// Reach a target weight by a target date
    RateToTargetByDate {
        target_weight_kg: f64,
        target_date: NaiveDate,
    },
    /// Explicit opt-out of any deficit or surplus
    TdeeOnly,
    /// A user-specified daily calorie literal, ignoring TDEE
    FixedCalories { kcal: u32 },
}

/// The single user profile: identity, body data, goal configuration,
/// and values derived by the ledger at each day-open.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub sex: Sex,
    pub birth_date: NaiveDate,
    /// Cached calendar age; refreshed by the birthday check at day-open
    pub age: u32,
    pub current_weight_kg: f64,
    pub height_cm: f64,
    pub activity: ActivityLevel,
    pub use_metric: bool,
    pub strategy: GoalStrategy,
    /// First day ever tracked; day numbers count from here
    pub start_date: NaiveDate,
    pub bmr: f64,
    pub daily_calorie_goal: u32,
    pub highest_streak: u32,
    pub highest_activity_streak: u32,
}

impl Profile {
    pub fn new(
        name: impl Into<String>,
        sex: Sex,
        birth_date: NaiveDate,
        current_weight_kg: f64,
        height_cm: f64,
        activity: ActivityLevel,
        use_metric: bool,
        strategy: GoalStrategy,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            sex,
            birth_date,
            age: crate::metabolic::age_on(birth_date, start_date),
            current_weight_kg,
            height_cm,
            activity,
            use_metric,
            strategy,
            start_date,
            bmr: 0.0,
            daily_calorie_goal: 0,
            highest_streak: 0,
            highest_activity_streak: 0,
        }
    }
}

// ============================================================================
// Diary Types
// ============================================================================

/// Category of a diary entry
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum EntryCategory {
    Food,
    Workout,
    Water,
}

/// A single food, workout, or water event belonging to one daily record
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DiaryEntry {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub category: EntryCategory,
    pub description: String,
    /// Free-form amount text for water entries, e.g. "1/2 gal" or "16 fl oz"
    pub detail: String,
    /// Signed contribution: food positive, workout negative, water zero
    pub calories: i32,
    pub fat_g: f64,
    pub carb_g: f64,
    pub protein_g: f64,
}

impl DiaryEntry {
    /// A food entry with a full macro breakdown (grams)
    pub fn food(
        description: impl Into<String>,
        calories: i32,
        fat_g: f64,
        carb_g: f64,
        protein_g: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            category: EntryCategory::Food,
            description: description.into(),
            detail: String::new(),
            calories: calories.max(0),
            fat_g,
            carb_g,
            protein_g,
        }
    }

    /// A quick-add food entry: calories only, no macro data
    pub fn quick_food(description: impl Into<String>, calories: i32) -> Self {
        Self::food(description, calories, 0.0, 0.0, 0.0)
    }

    /// A workout entry; `calories_burned` is stored as a negative contribution
    pub fn workout(description: impl Into<String>, calories_burned: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            category: EntryCategory::Workout,
            description: description.into(),
            detail: String::new(),
            calories: -calories_burned.abs(),
            fat_g: 0.0,
            carb_g: 0.0,
            protein_g: 0.0,
        }
    }

    /// A water entry; `detail` carries the amount text, e.g. "1/2 gal"
    pub fn water(detail: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            category: EntryCategory::Water,
            description: "Water".into(),
            detail: detail.into(),
            calories: 0,
            fat_g: 0.0,
            carb_g: 0.0,
            protein_g: 0.0,
        }
    }

    /// A food entry with calories but no macro breakdown
    pub fn is_quick_add(&self) -> bool {
        self.category == EntryCategory::Food
            && self.fat_g == 0.0
            && self.carb_g == 0.0
            && self.protein_g == 0.0
    }
}

/// A timestamped weight sample within the open day
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WeighIn {
    pub id: Uuid,
    pub logged_at: DateTime<Utc>,
    pub weight_kg: f64,
}

impl WeighIn {
    pub fn new(weight_kg: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            logged_at: Utc::now(),
            weight_kg,
        }
    }
}

// ============================================================================
// Water Units
// ============================================================================

/// Display unit for water totals
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WaterUnit {
    Milliliters,
    Liters,
    FluidOunces,
    Gallons,
}

impl WaterUnit {
    /// Short display label, matching the accepted input aliases
    pub fn label(self) -> &'static str {
        match self {
            WaterUnit::Milliliters => "ml",
            WaterUnit::Liters => "l",
            WaterUnit::FluidOunces => "fl oz",
            WaterUnit::Gallons => "gal",
        }
    }
}

// ============================================================================
// Daily Record
// ============================================================================

/// One calendar day's ledger: the locked goal, derived totals, and the
/// diary entries and weigh-ins they are derived from.
///
/// Exactly one record is open (mutable) at a time; closed records are
/// read-only history.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyRecord {
    pub date: NaiveDate,
    /// Snapshotted at day-open; never recomputed afterward
    pub calorie_goal: u32,
    /// Derived: food calories minus workout calories
    pub calorie_intake: i32,
    /// Derived water total, expressed in `water_unit`
    pub water_intake: f64,
    pub water_unit: WaterUnit,
    /// Carried from the prior day's record; user-adjustable while open
    pub water_goal: f64,
    /// Average of same-day weigh-ins, 0 if none
    pub weigh_in_kg: f64,
    /// Live while open; authoritative once closed
    pub pass_fail: bool,
    pub closed: bool,
    pub entries: Vec<DiaryEntry>,
    pub weigh_ins: Vec<WeighIn>,
}

impl DailyRecord {
    pub fn new(date: NaiveDate, calorie_goal: u32, water_goal: f64, water_unit: WaterUnit) -> Self {
        Self {
            date,
            calorie_goal,
            calorie_intake: 0,
            water_intake: 0.0,
            water_unit,
            water_goal,
            weigh_in_kg: 0.0,
            pass_fail: true,
            closed: false,
            entries: Vec::new(),
            weigh_ins: Vec::new(),
        }
    }

    /// Whether this day logged at least one workout entry
    pub fn has_workout(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.category == EntryCategory::Workout)
    }

    /// Average of the day's weigh-ins, 0 if there are none
    pub fn average_weigh_in(&self) -> f64 {
        if self.weigh_ins.is_empty() {
            return 0.0;
        }
        let total: f64 = self.weigh_ins.iter().map(|w| w.weight_kg).sum();
        total / self.weigh_ins.len() as f64
    }
}

// ============================================================================
// Data Quality Flags
// ============================================================================

/// Conditions where the engine substituted a safe default instead of
/// failing; surfaced so the UI can prompt for the missing data.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DataQuality {
    /// The resolved goal was non-positive and was clamped to the safety floor
    GoalClamped,
    /// Weight or height was missing, so BMR could not be recomputed
    MissingBodyData,
}
