//! Pure conversion engine: distance plus a factor option yields a well volume
//! in liters, with a derived equivalent in barrels.

use crate::domain::Selector;
use crate::error::AppError;

/// One oil barrel in liters.
pub const LITERS_PER_BARREL: f64 = 158.987;

/// Full-precision volume in liters for a measured distance.
pub fn compute_volume(distance: f64, selector: Selector) -> f64 {
    distance * selector.factor()
}

pub fn to_barrels(liters: f64) -> f64 {
    liters / LITERS_PER_BARREL
}

/// Rounds to one decimal place for storage and display.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Parses a submitted distance field, rejecting anything that is not a number.
pub fn parse_distance(raw: &str) -> Result<f64, AppError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| AppError::invalid_input(format!("'{raw}' is not a valid number")))
}
