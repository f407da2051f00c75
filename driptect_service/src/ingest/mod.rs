//! Data acquisition for the dashboard.
//!
//! Submodules:
//! - `simulator`  - synthetic sensor readings on a fixed cadence, standing in
//!   for the field hardware.
//! - `prediction` - client for the external flood-risk prediction service.

pub mod prediction;
pub mod simulator;
