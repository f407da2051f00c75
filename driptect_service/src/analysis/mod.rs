//! Derived display values for the dashboard.
//!
//! Pure functions only: raw sensor units in, display-ready numbers out.
//!
//! Submodules:
//! - `conversions` - raw ADC units to soil-moisture percent and rainfall mm.

pub mod conversions;
