//! Prediction orchestration and the dashboard event loop.
//!
//! [`Dashboard`] is the single writer of [`DashboardState`]. Generator ticks,
//! manual edits, triggers and request completions all arrive as messages and
//! are applied one at a time; each applied change is published as a fresh
//! snapshot on a `watch` channel for renderers.
//!
//! At most one prediction request is outstanding. The request itself runs on
//! its own task and reports back through a channel, so the loop keeps
//! applying telemetry while the service thinks.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, watch};

use crate::ingest::prediction::PredictionClient;
use crate::logging::{self, Component};
use crate::model::{SensorField, SensorReading};

use super::state::{DashboardEvent, DashboardState};

/// User actions coming from the control surface.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlCommand {
    /// The "Get Prediction" trigger.
    RequestPrediction,
    /// A range control moved.
    UpdateField { field: SensorField, value: f64 },
    /// The view is going away.
    Shutdown,
}

pub struct Dashboard {
    state: DashboardState,
    client: Arc<dyn PredictionClient>,
    completions_tx: mpsc::UnboundedSender<DashboardEvent>,
    completions_rx: mpsc::UnboundedReceiver<DashboardEvent>,
    snapshots: watch::Sender<DashboardState>,
}

impl Dashboard {
    pub fn new(client: Arc<dyn PredictionClient>) -> Self {
        Self::with_state(client, DashboardState::default())
    }

    pub fn with_state(client: Arc<dyn PredictionClient>, state: DashboardState) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (snapshots, _) = watch::channel(state.clone());

        Self {
            state,
            client,
            completions_tx,
            completions_rx,
            snapshots,
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    /// Receiver of whole-state snapshots, updated after every applied event.
    pub fn subscribe(&self) -> watch::Receiver<DashboardState> {
        self.snapshots.subscribe()
    }

    fn dispatch(&mut self, event: DashboardEvent) -> bool {
        let changed = self.state.apply(event);
        if changed {
            self.snapshots.send_replace(self.state.clone());
        }
        changed
    }

    /// Replaces the current reading with a generator tick.
    pub fn apply_telemetry(&mut self, reading: SensorReading) {
        self.dispatch(DashboardEvent::Telemetry(reading));
    }

    /// Applies a manual edit. Non-finite values are silently discarded;
    /// returns whether the edit was applied.
    pub fn update_field(&mut self, field: SensorField, value: f64) -> bool {
        let applied = self.dispatch(DashboardEvent::FieldEdited { field, value });
        if !applied {
            logging::log_discarded_edit(field, value);
        }
        applied
    }

    /// Sends the current reading to the prediction service.
    ///
    /// Returns `false` without touching anything when a request is already in
    /// flight. Otherwise marks the dashboard loading, clears the previous
    /// error and spawns the request; its outcome is applied when the
    /// completion is received (see [`settle`](Self::settle) and
    /// [`run`](Self::run)). Must be called inside a tokio runtime.
    pub fn request_prediction(&mut self) -> bool {
        if self.state.loading() {
            tracing::debug!(component = %Component::Prediction, "Request already in flight, trigger ignored");
            return false;
        }

        self.dispatch(DashboardEvent::RequestStarted);

        let reading = self.state.reading;
        let client = Arc::clone(&self.client);
        let completions = self.completions_tx.clone();

        tokio::spawn(async move {
            let event = resolve_prediction(client.as_ref(), &reading).await;
            // receiver lives as long as the dashboard
            let _ = completions.send(event);
        });

        true
    }

    /// Waits for the in-flight request to complete and applies its outcome.
    /// Returns immediately with `false` if nothing is in flight.
    pub async fn settle(&mut self) -> bool {
        if !self.state.loading() {
            return false;
        }
        match self.completions_rx.recv().await {
            Some(event) => self.dispatch(event),
            None => false,
        }
    }

    /// Runs the dashboard until a `Shutdown` command arrives or the command
    /// channel closes, then returns the final state.
    ///
    /// A closed telemetry channel just stops the ticks; the dashboard keeps
    /// serving manual commands.
    pub async fn run(
        mut self,
        mut telemetry: mpsc::Receiver<SensorReading>,
        mut commands: mpsc::Receiver<ControlCommand>,
    ) -> DashboardState {
        tracing::info!(component = %Component::Dashboard, "Dashboard running");

        loop {
            tokio::select! {
                Some(reading) = telemetry.recv() => self.apply_telemetry(reading),
                Some(event) = self.completions_rx.recv() => {
                    self.dispatch(event);
                }
                command = commands.recv() => match command {
                    Some(ControlCommand::RequestPrediction) => {
                        self.request_prediction();
                    }
                    Some(ControlCommand::UpdateField { field, value }) => {
                        self.update_field(field, value);
                    }
                    Some(ControlCommand::Shutdown) | None => break,
                },
            }
        }

        tracing::info!(component = %Component::Dashboard, "Dashboard stopped");
        self.state
    }
}

/// Performs one prediction request and turns its outcome into the event that
/// completes the lifecycle. Never fails: errors become `RequestFailed`.
pub async fn resolve_prediction(client: &dyn PredictionClient, reading: &SensorReading) -> DashboardEvent {
    match client.predict(reading).await {
        Ok(result) => {
            tracing::info!(
                component = %Component::Prediction,
                prediction = %result.prediction,
                message = %result.message,
                "Prediction received"
            );
            DashboardEvent::RequestSucceeded {
                result,
                received_at: Utc::now(),
            }
        }
        Err(error) => {
            logging::log_prediction_failure(&error);
            DashboardEvent::RequestFailed { error }
        }
    }
}
