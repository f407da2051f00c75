//! Raw ADC unit conversions.
//!
//! Both 12-bit channels read *inverted*: 0 is fully wet / heavy rain and
//! 4095 is dry / no rain. The conversions flip the scale and round to one
//! decimal place, falling back to 0.0 whenever the arithmetic is not finite.

use crate::model::ADC_FULL_SCALE;

/// Rainfall in millimetres corresponding to a raw reading of 0.
pub const MAX_RAINFALL_MM: f64 = 243.0;

/// Soil moisture as a percentage in [0, 100], one decimal place.
///
/// `(1 - raw / 4095) * 100`, clamped; non-finite input gives 0.0.
pub fn soil_moisture_percentage(raw: f64) -> f64 {
    let percentage = (1.0 - raw / ADC_FULL_SCALE) * 100.0;
    if !percentage.is_finite() {
        return 0.0;
    }
    round_one_decimal(percentage.clamp(0.0, 100.0))
}

/// Rainfall in millimetres, never negative, one decimal place.
///
/// `(1 - raw / 4095) * 243`, floored at 0; non-finite input gives 0.0.
pub fn rainfall_millimeters(raw: f64) -> f64 {
    let mm = (1.0 - raw / ADC_FULL_SCALE) * MAX_RAINFALL_MM;
    if !mm.is_finite() {
        return 0.0;
    }
    round_one_decimal(mm.max(0.0))
}

/// Rounds half away from zero to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    let rounded = (value * 10.0).round() / 10.0;
    // -0.0 would print as "-0.0"
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Formats a value with exactly one decimal, the way every number on the
/// dashboard is shown.
pub fn format_one_decimal(value: f64) -> String {
    format!("{:.1}", round_one_decimal(value))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
