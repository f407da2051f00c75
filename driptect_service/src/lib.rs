//! DripTect flood-risk dashboard service.
//!
//! Shows synthetic soil moisture, rainfall, temperature, humidity and
//! distance readings and asks an external prediction service whether they
//! add up to a flood risk.

pub mod alert;
pub mod analysis;
pub mod config;
pub mod console;
pub mod dashboard;
pub mod ingest;
pub mod logging;
pub mod model;
