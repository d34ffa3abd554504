//! Diary aggregation: folding a day's entries into live totals.
//!
//! Intake counts food positively and workouts negatively; water entries
//! never touch intake. The macro split only draws on food entries that
//! declare macros, with quick-add calories isolated in an unclassified
//! bucket so a macro-based progress bar can never exceed total intake.

use crate::{units, DiaryEntry, EntryCategory, WaterUnit};

pub const KCAL_PER_G_FAT: f64 = 9.0;
pub const KCAL_PER_G_CARB: f64 = 4.0;
pub const KCAL_PER_G_PROTEIN: f64 = 4.0;

/// Calorie breakdown by macro source
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MacroSplit {
    pub fat_kcal: f64,
    pub carb_kcal: f64,
    pub protein_kcal: f64,
    /// Calories from quick-add food entries with no macro data
    pub unclassified_kcal: f64,
}

impl MacroSplit {
    /// Sum of the macro-classified buckets, excluding unclassified
    pub fn classified_total(&self) -> f64 {
        self.fat_kcal + self.carb_kcal + self.protein_kcal
    }
}

/// A day's aggregated totals
#[derive(Clone, Debug, PartialEq)]
pub struct DayTotals {
    /// Net calorie intake: food minus workout magnitudes
    pub intake: i32,
    pub macros: MacroSplit,
    /// Water volume in the requested display unit
    pub water_total: f64,
}

/// Fold a day's entries into intake, macro split, and water totals
///
/// Water entries with unrecognized units contribute zero rather than
/// failing the whole aggregation.
pub fn aggregate(entries: &[DiaryEntry], water_unit: WaterUnit) -> DayTotals {
    let mut intake: i64 = 0;
    let mut macros = MacroSplit::default();
    let mut water_total = 0.0;

    for entry in entries {
        match entry.category {
            EntryCategory::Food => {
                intake += i64::from(entry.calories);

                if entry.is_quick_add() {
                    macros.unclassified_kcal += f64::from(entry.calories);
                } else {
                    if entry.fat_g > 0.0 {
                        macros.fat_kcal += entry.fat_g * KCAL_PER_G_FAT;
                    }
                    if entry.carb_g > 0.0 {
                        macros.carb_kcal += entry.carb_g * KCAL_PER_G_CARB;
                    }
                    if entry.protein_g > 0.0 {
                        macros.protein_kcal += entry.protein_g * KCAL_PER_G_PROTEIN;
                    }
                }
            }

            EntryCategory::Workout => {
                intake -= i64::from(entry.calories.abs());
            }

            EntryCategory::Water => {
                let (amount, unit) = units::parse_water_detail(&entry.detail);
                match units::convert_water(amount, &unit, water_unit) {
                    Ok(converted) => water_total += converted,
                    Err(e) => {
                        tracing::warn!("Skipping water entry {:?}: {}", entry.detail, e);
                    }
                }
            }
        }
    }

    DayTotals {
        intake: intake.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32,
        macros,
        water_total,
    }
}
