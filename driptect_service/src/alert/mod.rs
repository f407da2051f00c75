//! Flood-risk status shown at the top of the dashboard.
//!
//! Submodules:
//! - `status` - classifies (error, prediction) into a risk status and the
//!   text the dashboard shows for it.

pub mod status;
