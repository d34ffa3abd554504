//! Unit conversion for mass and water volume.
//!
//! All conversions are pure and total over the recognized unit sets;
//! unrecognized unit strings fail with `Error::UnknownUnit` and callers
//! recover by treating the amount as zero. Water amounts accept fraction
//! tokens ("1/4", "1/2", "3/4", "1") as quantity shorthand.

use crate::{Error, Result, WaterUnit};
use once_cell::sync::Lazy;
use std::collections::HashMap;

pub const ML_PER_FL_OZ: f64 = 29.5735;
pub const ML_PER_GALLON: f64 = 3785.41;
pub const ML_PER_LITER: f64 = 1000.0;
pub const KG_PER_LB: f64 = 0.453592;

/// Accepted volume unit spellings, normalized to a typed unit
static VOLUME_ALIASES: Lazy<HashMap<&'static str, WaterUnit>> = Lazy::new(|| {
    let mut aliases = HashMap::new();
    aliases.insert("ml", WaterUnit::Milliliters);
    aliases.insert("milliliters", WaterUnit::Milliliters);
    aliases.insert("l", WaterUnit::Liters);
    aliases.insert("liters", WaterUnit::Liters);
    aliases.insert("gal", WaterUnit::Gallons);
    aliases.insert("gallons", WaterUnit::Gallons);
    aliases.insert("fl", WaterUnit::FluidOunces);
    aliases.insert("fl oz", WaterUnit::FluidOunces);
    aliases
});

/// Quantity shorthand accepted in water amount text
static FRACTION_TOKENS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    let mut tokens = HashMap::new();
    tokens.insert("1/4", 0.25);
    tokens.insert("1/2", 0.5);
    tokens.insert("3/4", 0.75);
    tokens.insert("1", 1.0);
    tokens
});

/// Parse a volume unit string into a typed unit
pub fn parse_water_unit(unit: &str) -> Result<WaterUnit> {
    VOLUME_ALIASES
        .get(unit.to_lowercase().trim())
        .copied()
        .ok_or_else(|| Error::UnknownUnit(unit.to_string()))
}

/// Convert a mass amount in the given unit to kilograms
pub fn mass_to_kg(value: f64, unit: &str) -> Result<f64> {
    match unit.to_lowercase().trim() {
        "kg" | "kilograms" => Ok(value),
        "lb" | "lbs" | "pounds" => Ok(value * KG_PER_LB),
        other => Err(Error::UnknownUnit(other.to_string())),
    }
}

/// Convert kilograms into the profile's display mass unit (kg or lb)
pub fn kg_to_display(value_kg: f64, use_metric: bool) -> f64 {
    if use_metric {
        value_kg
    } else {
        value_kg / KG_PER_LB
    }
}

/// Convert a volume amount in the given unit to milliliters
pub fn volume_to_ml(value: f64, unit: &str) -> Result<f64> {
    Ok(match parse_water_unit(unit)? {
        WaterUnit::Milliliters => value,
        WaterUnit::Liters => value * ML_PER_LITER,
        WaterUnit::Gallons => value * ML_PER_GALLON,
        WaterUnit::FluidOunces => value * ML_PER_FL_OZ,
    })
}

/// Convert milliliters into the requested display unit
pub fn ml_to_display(value_ml: f64, unit: WaterUnit) -> f64 {
    match unit {
        WaterUnit::Milliliters => value_ml,
        WaterUnit::Liters => value_ml / ML_PER_LITER,
        WaterUnit::Gallons => value_ml / ML_PER_GALLON,
        WaterUnit::FluidOunces => value_ml / ML_PER_FL_OZ,
    }
}

/// Convert a water amount between units
pub fn convert_water(amount: f64, from_unit: &str, to_unit: WaterUnit) -> Result<f64> {
    Ok(ml_to_display(volume_to_ml(amount, from_unit)?, to_unit))
}

/// Extract the amount and unit from a water entry's detail text
///
/// Accepts "<amount> <unit>" where amount is a number or a fraction token,
/// and bare "<amount> fl oz". Unparseable text resolves to (0, "ml") so a
/// malformed entry contributes nothing to the day's total.
pub fn parse_water_detail(detail: &str) -> (f64, String) {
    let parts: Vec<&str> = detail.split_whitespace().collect();

    if parts.len() == 2 {
        if let Some(amount) = parse_amount(parts[0]) {
            return (amount, parts[1].to_string());
        }
    }

    // "fl oz" is a two-token unit, so "<amount> fl oz" lands here
    let lowered = detail.to_lowercase();
    if let Some(number) = lowered.strip_suffix("fl oz") {
        if let Some(amount) = parse_amount(number.trim()) {
            return (amount, "fl oz".to_string());
        }
    }

    tracing::warn!("Unparseable water amount {:?}, treating as zero", detail);
    (0.0, "ml".to_string())
}

/// Resolve a fraction token or a plain number
fn parse_amount(token: &str) -> Option<f64> {
    if let Some(fraction) = FRACTION_TOKENS.get(token) {
        return Some(*fraction);
    }
    token.parse::<f64>().ok()
}
