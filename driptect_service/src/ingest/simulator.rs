//! Synthetic telemetry generator.
//!
//! Produces a complete [`SensorReading`] every period, drawing each field
//! uniformly from its nominal band. A reading is always built in full before
//! it is sent, so consumers never see a mix of two ticks.
//!
//! The generator runs as a tokio task and stops when its handle is stopped
//! or dropped, or when the receiving side goes away.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::logging::Component;
use crate::model::{ADC_FULL_SCALE, SensorReading};

/// Default generator period.
pub const DEFAULT_PERIOD: Duration = Duration::from_millis(5000);

/// Draws one synthetic reading.
///
/// - soil_moisture, rainfall: floor of a uniform draw in [0, 4095)
/// - temperature: [20, 35) °C
/// - humidity: [40, 80) %
/// - distance: [50, 250) cm
pub fn generate_reading<R: Rng + ?Sized>(rng: &mut R) -> SensorReading {
    SensorReading {
        soil_moisture: rng.gen_range(0.0..ADC_FULL_SCALE).floor() as i32,
        rainfall: rng.gen_range(0.0..ADC_FULL_SCALE).floor() as i32,
        temperature: rng.gen_range(20.0..35.0),
        humidity: rng.gen_range(40.0..80.0),
        distance: rng.gen_range(50.0..250.0),
    }
}

/// Handle to a running generator task.
///
/// Dropping the handle cancels the task, so a torn-down view can never be
/// written to by a leftover timer.
#[derive(Debug)]
pub struct TelemetryGenerator {
    handle: JoinHandle<()>,
}

impl TelemetryGenerator {
    /// Starts a generator seeded from OS entropy.
    pub fn spawn(period: Duration, sink: mpsc::Sender<SensorReading>) -> Self {
        Self::spawn_with_rng(period, sink, StdRng::from_entropy())
    }

    /// Starts a generator with a caller-supplied RNG (deterministic in tests).
    ///
    /// The first reading is emitted one full period after the call.
    pub fn spawn_with_rng(period: Duration, sink: mpsc::Sender<SensorReading>, mut rng: StdRng) -> Self {
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut tick: u64 = 0;

            loop {
                interval.tick().await;
                tick += 1;

                let reading = generate_reading(&mut rng);
                tracing::debug!(
                    component = %Component::Telemetry,
                    tick,
                    soil_moisture = reading.soil_moisture,
                    rainfall = reading.rainfall,
                    temperature = reading.temperature,
                    humidity = reading.humidity,
                    distance = reading.distance,
                    "Generated reading"
                );

                if sink.send(reading).await.is_err() {
                    tracing::debug!(component = %Component::Telemetry, "Reading sink closed, generator exiting");
                    break;
                }
            }
        });

        tracing::info!(
            component = %Component::Telemetry,
            period_ms = period.as_millis() as u64,
            "Telemetry generator started"
        );

        Self { handle }
    }

    /// Whether the task has exited (stopped, or its sink closed).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancels the generator: no further ticks are generated. Readings
    /// already queued in the sink are still delivered.
    pub fn stop(self) {
        // Drop does the work
    }
}

impl Drop for TelemetryGenerator {
    fn drop(&mut self) {
        if !self.handle.is_finished() {
            self.handle.abort();
            tracing::info!(component = %Component::Telemetry, "Telemetry generator stopped");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
