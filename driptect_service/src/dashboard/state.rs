//! Dashboard state container.
//!
//! Every change to the dashboard is a [`DashboardEvent`] applied by
//! [`DashboardState::apply`]. The state is only ever observed between events,
//! so a reader sees either the old snapshot or the new one, never a mix.
//!
//! # Invariants
//! - `loading()` is true exactly while `phase == InFlight`; a start event
//!   while in flight is ignored.
//! - `is_connected` reflects the most recent completed request only.
//! - A failure keeps the previous `prediction` and `last_update`.
//! - `last_update` is only ever set by a success.
//!
//! # Clock injection
//! Success events carry their own `received_at` timestamp instead of the
//! reducer calling `Utc::now()`, so reducer tests are deterministic.

use chrono::{DateTime, Utc};

use crate::model::{PredictionError, PredictionResult, SensorField, SensorReading};

/// Where the prediction request lifecycle currently is.
///
/// ```text
/// Idle | Succeeded | Failed --start--> InFlight --ok--> Succeeded
///                                               \--err-> Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestPhase {
    Idle,
    InFlight,
    Succeeded,
    Failed,
}

/// Discrete changes applied to [`DashboardState`].
#[derive(Debug, Clone, PartialEq)]
pub enum DashboardEvent {
    /// Generator tick: replaces the whole reading.
    Telemetry(SensorReading),
    /// Manual control moved.
    FieldEdited { field: SensorField, value: f64 },
    /// A prediction request is about to be sent.
    RequestStarted,
    RequestSucceeded {
        result: PredictionResult,
        received_at: DateTime<Utc>,
    },
    RequestFailed { error: PredictionError },
}

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardState {
    pub reading: SensorReading,
    pub prediction: Option<PredictionResult>,
    pub phase: RequestPhase,
    pub is_connected: bool,
    pub last_update: Option<DateTime<Utc>>,
    pub error: Option<String>,
    /// Number of requests dispatched so far; tells two outcomes with the
    /// same phase apart.
    pub requests_started: u64,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self {
            reading: SensorReading::default(),
            prediction: None,
            phase: RequestPhase::Idle,
            is_connected: false,
            last_update: None,
            error: None,
            requests_started: 0,
        }
    }
}

impl DashboardState {
    /// True exactly while a prediction request is outstanding.
    pub fn loading(&self) -> bool {
        self.phase == RequestPhase::InFlight
    }

    /// Applies one event. Returns `false` when the event was a no-op
    /// (rejected edit, start while in flight, completion with nothing in
    /// flight), in which case the state is untouched.
    pub fn apply(&mut self, event: DashboardEvent) -> bool {
        match event {
            DashboardEvent::Telemetry(reading) => {
                self.reading = reading;
                true
            }
            DashboardEvent::FieldEdited { field, value } => {
                match self.reading.try_update_field(field, value) {
                    Some(next) => {
                        self.reading = next;
                        true
                    }
                    None => false,
                }
            }
            DashboardEvent::RequestStarted => {
                if self.loading() {
                    return false;
                }
                self.phase = RequestPhase::InFlight;
                self.error = None;
                self.requests_started += 1;
                true
            }
            DashboardEvent::RequestSucceeded { result, received_at } => {
                if !self.loading() {
                    return false;
                }
                self.prediction = Some(result);
                self.last_update = Some(received_at);
                self.is_connected = true;
                self.error = None;
                self.phase = RequestPhase::Succeeded;
                true
            }
            DashboardEvent::RequestFailed { error } => {
                if !self.loading() {
                    return false;
                }
                self.error = Some(error.to_string());
                self.is_connected = false;
                self.phase = RequestPhase::Failed;
                true
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
