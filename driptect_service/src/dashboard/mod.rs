//! Dashboard state and the prediction request lifecycle.
//!
//! Submodules:
//! - `state`        - the `DashboardState` aggregate and the reducer that
//!   applies one `DashboardEvent` at a time.
//! - `orchestrator` - the `Dashboard` runtime: owns the state, gates and
//!   dispatches prediction requests, and runs the event loop.

pub mod orchestrator;
pub mod state;

pub use orchestrator::{ControlCommand, Dashboard, resolve_prediction};
pub use state::{DashboardEvent, DashboardState, RequestPhase};
