//! Core data types for the DripTect flood-risk dashboard.
//!
//! This module defines the shared domain model imported by all other modules:
//! the five-field sensor snapshot, the prediction service's answer and the
//! failures a prediction request can end in. It has no I/O.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

// ---------------------------------------------------------------------------
// Raw sensor scale
// ---------------------------------------------------------------------------

/// Full-scale value of the 12-bit ADC channels (soil moisture, rainfall).
pub const ADC_FULL_SCALE: f64 = 4095.0;

// ---------------------------------------------------------------------------
// Reading types
// ---------------------------------------------------------------------------

/// One snapshot of every environmental measurement shown on the dashboard.
///
/// Doubles as the JSON body of a prediction request, so the field names are
/// the wire names expected by the prediction service.
///
/// Readings are values: the generator replaces a whole reading at once and a
/// manual edit produces a new reading via [`SensorReading::update_field`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    /// Raw ADC units in [0, 4095]; higher means drier soil.
    pub soil_moisture: i32,
    /// Raw ADC units in [0, 4095]; higher means less rain.
    pub rainfall: i32,
    /// Degrees Celsius, nominally 20-35.
    pub temperature: f64,
    /// Relative humidity in percent, nominally 40-80.
    pub humidity: f64,
    /// Water-surface distance in centimetres, nominally 50-250.
    pub distance: f64,
}

impl Default for SensorReading {
    fn default() -> Self {
        Self {
            soil_moisture: 2048,
            rainfall: 2048,
            temperature: 25.0,
            humidity: 60.0,
            distance: 150.0,
        }
    }
}

impl SensorReading {
    /// Returns a copy of this reading with exactly one field replaced.
    ///
    /// Non-finite values (NaN, ±inf) are rejected and the reading comes back
    /// unchanged; callers get no error for this. Integer fields keep the
    /// truncated integer part of `value`, like a range input parsed with
    /// `parseInt`.
    pub fn update_field(&self, field: SensorField, value: f64) -> SensorReading {
        self.try_update_field(field, value).unwrap_or(*self)
    }

    /// Like [`update_field`](Self::update_field) but returns `None` when the
    /// edit was discarded, so the caller can log it.
    pub fn try_update_field(&self, field: SensorField, value: f64) -> Option<SensorReading> {
        if !value.is_finite() {
            return None;
        }

        let mut next = *self;
        match field {
            // `as` saturates for out-of-range finite values
            SensorField::SoilMoisture => next.soil_moisture = value.trunc() as i32,
            SensorField::Rainfall => next.rainfall = value.trunc() as i32,
            SensorField::Temperature => next.temperature = value,
            SensorField::Humidity => next.humidity = value,
            SensorField::Distance => next.distance = value,
        }
        Some(next)
    }
}

/// Names one field of a [`SensorReading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorField {
    SoilMoisture,
    Rainfall,
    Temperature,
    Humidity,
    Distance,
}

impl SensorField {
    /// All fields in dashboard display order.
    pub const ALL: [SensorField; 5] = [
        SensorField::SoilMoisture,
        SensorField::Rainfall,
        SensorField::Temperature,
        SensorField::Humidity,
        SensorField::Distance,
    ];

    /// Wire / command name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            SensorField::SoilMoisture => "soil_moisture",
            SensorField::Rainfall => "rainfall",
            SensorField::Temperature => "temperature",
            SensorField::Humidity => "humidity",
            SensorField::Distance => "distance",
        }
    }

    /// Human-readable label used by the console.
    pub fn label(&self) -> &'static str {
        match self {
            SensorField::SoilMoisture => "Soil Moisture",
            SensorField::Rainfall => "Rainfall",
            SensorField::Temperature => "Temperature",
            SensorField::Humidity => "Humidity",
            SensorField::Distance => "Distance",
        }
    }

    /// Bounds of the manual control for this field.
    pub fn range(&self) -> FieldRange {
        match self {
            SensorField::SoilMoisture | SensorField::Rainfall => FieldRange {
                min: 0.0,
                max: ADC_FULL_SCALE,
                step: 1.0,
            },
            SensorField::Temperature => FieldRange { min: 20.0, max: 35.0, step: 0.1 },
            SensorField::Humidity => FieldRange { min: 40.0, max: 80.0, step: 0.1 },
            SensorField::Distance => FieldRange { min: 50.0, max: 250.0, step: 0.1 },
        }
    }
}

impl fmt::Display for SensorField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SensorField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "soil_moisture" | "soil" => Ok(SensorField::SoilMoisture),
            "rainfall" | "rain" => Ok(SensorField::Rainfall),
            "temperature" | "temp" => Ok(SensorField::Temperature),
            "humidity" | "humd" => Ok(SensorField::Humidity),
            "distance" | "dist" => Ok(SensorField::Distance),
            other => Err(format!("unknown sensor field: {}", other)),
        }
    }
}

/// Inclusive bounds and granularity of a manual range control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
    pub step: f64,
}

impl FieldRange {
    /// Limits `value` to the control's bounds and snaps it to the nearest
    /// step, as a range input does. Non-finite values pass through untouched
    /// so that [`SensorReading::update_field`] can reject them.
    pub fn clamp(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return value;
        }
        let steps = ((value.clamp(self.min, self.max) - self.min) / self.step).round();
        let snapped = self.min + steps * self.step;
        // undo float drift from the multiplication (20 + 73 * 0.1)
        let scale = (1.0 / self.step).round().max(1.0);
        ((snapped * scale).round() / scale).clamp(self.min, self.max)
    }
}

// ---------------------------------------------------------------------------
// Prediction types
// ---------------------------------------------------------------------------

/// Risk value the prediction service uses for "flood likely".
pub const HIGH_RISK: i64 = 1;

/// An answer from the prediction service that carried a `prediction` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredictionResult {
    /// 0 = low risk, 1 = high risk. Kept exactly as received: the service is
    /// trusted for anything present, including null, strings and fractions.
    pub prediction: Value,
    /// Free text supplied by the service; empty if it sent none.
    pub message: String,
}

impl PredictionResult {
    pub fn new(prediction: impl Into<Value>, message: impl Into<String>) -> Self {
        Self {
            prediction: prediction.into(),
            message: message.into(),
        }
    }

    /// Only the number 1 counts as high risk; `"1"` and `true` do not.
    pub fn is_high_risk(&self) -> bool {
        self.prediction.as_f64() == Some(HIGH_RISK as f64)
    }
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Shown when a transport failure carries no message of its own.
pub const FALLBACK_ERROR_MESSAGE: &str = "Failed to connect to server";

/// Shown when the service answered 2xx but without a `prediction` field.
pub const INVALID_RESPONSE_MESSAGE: &str = "Invalid response format";

/// Ways a prediction request can fail.
///
/// The `Display` text is what the dashboard shows as its error string, so
/// schema failures and transport failures end up on the same path.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictionError {
    /// No response within the configured timeout.
    #[error("timeout of {timeout_ms}ms exceeded")]
    Timeout { timeout_ms: u64 },
    /// Non-2xx HTTP response.
    #[error("Request failed with status code {0}")]
    Status(u16),
    /// The server could not be reached (refused, DNS, reset ...).
    #[error("{}", transport_message(.0))]
    Transport(String),
    /// 2xx response whose body has no `prediction` field.
    #[error("{}", INVALID_RESPONSE_MESSAGE)]
    InvalidResponse,
}

fn transport_message(message: &str) -> &str {
    if message.trim().is_empty() {
        FALLBACK_ERROR_MESSAGE
    } else {
        message
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
