/// Integration tests for the prediction request lifecycle and the dashboard
/// event loop.
///
/// Tests verify:
/// 1. At most one prediction request is in flight
/// 2. Success / failure reconciliation of the dashboard state
/// 3. The reading sent is the one current at trigger time
/// 4. Generator ticks reach observers as whole readings
///
/// No network access: the prediction service is replaced by in-process
/// `PredictionClient` implementations.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use rand::SeedableRng;
use rand::rngs::StdRng;
use tokio::sync::{Notify, mpsc};

use driptect_service::alert::status::{RiskStatus, classify_status};
use driptect_service::dashboard::{ControlCommand, Dashboard, DashboardState, RequestPhase};
use driptect_service::ingest::prediction::PredictionClient;
use driptect_service::ingest::simulator::{TelemetryGenerator, generate_reading};
use driptect_service::model::{PredictionError, PredictionResult, SensorField, SensorReading};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Holds every request until `release` is notified.
struct GatedClient {
    calls: AtomicUsize,
    seen: Mutex<Vec<SensorReading>>,
    release: Notify,
    outcome: Result<PredictionResult, PredictionError>,
}

impl GatedClient {
    fn new(outcome: Result<PredictionResult, PredictionError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
            release: Notify::new(),
            outcome,
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PredictionClient for GatedClient {
    async fn predict(&self, reading: &SensorReading) -> Result<PredictionResult, PredictionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(*reading);
        self.release.notified().await;
        self.outcome.clone()
    }
}

/// Answers each request with the next scripted outcome.
struct ScriptedClient {
    outcomes: Mutex<VecDeque<Result<PredictionResult, PredictionError>>>,
}

impl ScriptedClient {
    fn new(outcomes: Vec<Result<PredictionResult, PredictionError>>) -> Self {
        Self {
            outcomes: Mutex::new(outcomes.into()),
        }
    }
}

#[async_trait]
impl PredictionClient for ScriptedClient {
    async fn predict(&self, _reading: &SensorReading) -> Result<PredictionResult, PredictionError> {
        self.outcomes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(PredictionError::Transport(String::new())))
    }
}

async fn let_tasks_run() {
    for _ in 0..5 {
        tokio::task::yield_now().await;
    }
}

fn high_risk() -> PredictionResult {
    PredictionResult::new(1, "High risk")
}

// ---------------------------------------------------------------------------
// 1. Re-entrancy
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_trigger_while_loading_is_ignored() {
    let client = Arc::new(GatedClient::new(Ok(high_risk())));
    let mut dashboard = Dashboard::new(client.clone());

    assert!(dashboard.request_prediction(), "first trigger should dispatch");
    let_tasks_run().await;
    assert!(dashboard.state().loading());

    let during = dashboard.state().clone();
    assert!(!dashboard.request_prediction(), "second trigger must be a no-op");
    assert_eq!(dashboard.state(), &during, "ignored trigger must not change state");

    client.release.notify_one();
    assert!(dashboard.settle().await);
    let_tasks_run().await;

    assert_eq!(client.calls(), 1, "exactly one request should reach the service");
    assert!(!dashboard.state().loading());
}

#[tokio::test]
async fn test_trigger_after_completion_dispatches_again() {
    let client = Arc::new(GatedClient::new(Ok(high_risk())));
    let mut dashboard = Dashboard::new(client.clone());

    for expected_calls in 1..=3 {
        assert!(dashboard.request_prediction());
        client.release.notify_one();
        assert!(dashboard.settle().await);
        assert_eq!(client.calls(), expected_calls);
    }
}

// ---------------------------------------------------------------------------
// 2. Reconciliation
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_successful_prediction_updates_state() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(high_risk())]));
    let mut dashboard = Dashboard::new(client);
    let before = Utc::now();

    dashboard.request_prediction();
    dashboard.settle().await;

    let state = dashboard.state();
    assert_eq!(state.prediction, Some(high_risk()));
    assert!(state.is_connected);
    assert!(state.error.is_none());
    assert!(!state.loading());
    assert_eq!(state.phase, RequestPhase::Succeeded);
    let stamped = state.last_update.expect("success should stamp last_update");
    assert!(stamped >= before, "last_update should not predate the request");
    assert_eq!(classify_status(state.error.as_deref(), state.prediction.as_ref()), RiskStatus::HighRisk);
}

#[tokio::test]
async fn test_failures_keep_stale_prediction_and_timestamp() {
    let failures = [
        PredictionError::Timeout { timeout_ms: 5000 },
        PredictionError::Status(500),
        PredictionError::InvalidResponse,
        PredictionError::Transport(String::new()),
    ];

    for failure in failures {
        let client = Arc::new(ScriptedClient::new(vec![Ok(high_risk()), Err(failure.clone())]));
        let mut dashboard = Dashboard::new(client);

        dashboard.request_prediction();
        dashboard.settle().await;
        let good = dashboard.state().clone();

        dashboard.request_prediction();
        dashboard.settle().await;
        let state = dashboard.state();

        assert_eq!(state.prediction, good.prediction, "{:?} cleared the prediction", failure);
        assert_eq!(state.last_update, good.last_update, "{:?} moved last_update", failure);
        assert!(!state.is_connected);
        assert!(!state.loading());
        let error = state.error.as_deref().expect("failure should set error");
        assert!(!error.is_empty());
        assert_eq!(error, failure.to_string());
        assert_eq!(
            classify_status(state.error.as_deref(), state.prediction.as_ref()),
            RiskStatus::ConnectionError
        );
    }
}

#[tokio::test]
async fn test_empty_transport_error_uses_fallback_message() {
    let client = Arc::new(ScriptedClient::new(vec![Err(PredictionError::Transport(String::new()))]));
    let mut dashboard = Dashboard::new(client);

    dashboard.request_prediction();
    dashboard.settle().await;

    assert_eq!(dashboard.state().error.as_deref(), Some("Failed to connect to server"));
}

#[tokio::test]
async fn test_new_request_clears_error_optimistically() {
    let client = Arc::new(GatedClient::new(Ok(high_risk())));
    let state = DashboardState {
        error: Some("Failed to connect to server".into()),
        phase: RequestPhase::Failed,
        ..Default::default()
    };
    let mut dashboard = Dashboard::with_state(client.clone(), state);

    dashboard.request_prediction();
    assert!(dashboard.state().error.is_none(), "error should clear as soon as the request starts");
    assert!(dashboard.state().loading());

    client.release.notify_one();
    dashboard.settle().await;
}

// ---------------------------------------------------------------------------
// 3. Request payload
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_request_uses_reading_current_at_trigger_time() {
    let client = Arc::new(GatedClient::new(Ok(high_risk())));
    let mut dashboard = Dashboard::new(client.clone());

    assert!(dashboard.update_field(SensorField::SoilMoisture, 100.0));
    let sent = dashboard.state().reading;

    dashboard.request_prediction();
    let_tasks_run().await;

    // telemetry keeps flowing while the request is out
    dashboard.apply_telemetry(generate_reading(&mut StdRng::seed_from_u64(5)));
    client.release.notify_one();
    dashboard.settle().await;

    assert_eq!(client.seen.lock().unwrap().as_slice(), &[sent]);
    assert_ne!(dashboard.state().reading, sent);
}

#[tokio::test]
async fn test_non_finite_edit_is_silently_discarded() {
    let client = Arc::new(ScriptedClient::new(vec![]));
    let mut dashboard = Dashboard::new(client);
    let before = dashboard.state().clone();

    assert!(!dashboard.update_field(SensorField::Distance, f64::NAN));
    assert!(!dashboard.update_field(SensorField::Rainfall, f64::INFINITY));
    assert_eq!(dashboard.state(), &before);
    assert!(dashboard.state().error.is_none(), "discarded edits surface no error");
}

// ---------------------------------------------------------------------------
// 4. Event loop
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_run_loop_processes_commands_until_shutdown() {
    let client = Arc::new(ScriptedClient::new(vec![Ok(PredictionResult::new(0, "Low risk"))]));
    let dashboard = Dashboard::new(client);
    let mut snapshots = dashboard.subscribe();

    let (_telemetry_tx, telemetry_rx) = mpsc::channel(4);
    let (command_tx, command_rx) = mpsc::channel(4);
    let running = tokio::spawn(dashboard.run(telemetry_rx, command_rx));

    command_tx
        .send(ControlCommand::UpdateField {
            field: SensorField::Temperature,
            value: 31.5,
        })
        .await
        .unwrap();
    command_tx.send(ControlCommand::RequestPrediction).await.unwrap();

    let settled = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            snapshots.changed().await.unwrap();
            let state = snapshots.borrow_and_update().clone();
            if state.phase == RequestPhase::Succeeded {
                return state;
            }
        }
    })
    .await
    .expect("prediction should complete");

    assert_eq!(settled.reading.temperature, 31.5);
    assert_eq!(settled.prediction, Some(PredictionResult::new(0, "Low risk")));

    command_tx.send(ControlCommand::Shutdown).await.unwrap();
    let final_state = running.await.unwrap();
    assert_eq!(final_state, settled);
}

#[tokio::test]
async fn test_run_loop_stops_when_commands_close() {
    let dashboard = Dashboard::new(Arc::new(ScriptedClient::new(vec![])));
    let (_telemetry_tx, telemetry_rx) = mpsc::channel(1);
    let (command_tx, command_rx) = mpsc::channel(1);
    let running = tokio::spawn(dashboard.run(telemetry_rx, command_rx));

    drop(command_tx);
    let final_state = tokio::time::timeout(Duration::from_secs(5), running)
        .await
        .expect("loop should exit")
        .unwrap();
    assert_eq!(final_state, DashboardState::default());
}

#[tokio::test(start_paused = true)]
async fn test_generator_ticks_reach_observers_as_whole_readings() {
    let seed = 9;
    let mut expected_rng = StdRng::seed_from_u64(seed);
    let expected: Vec<SensorReading> = (0..3).map(|_| generate_reading(&mut expected_rng)).collect();

    let dashboard = Dashboard::new(Arc::new(ScriptedClient::new(vec![])));
    let mut snapshots = dashboard.subscribe();
    let (telemetry_tx, telemetry_rx) = mpsc::channel(4);
    let (command_tx, command_rx) = mpsc::channel(1);

    let generator = TelemetryGenerator::spawn_with_rng(
        Duration::from_millis(5000),
        telemetry_tx,
        StdRng::seed_from_u64(seed),
    );
    let running = tokio::spawn(dashboard.run(telemetry_rx, command_rx));

    for want in &expected {
        snapshots.changed().await.unwrap();
        let seen = snapshots.borrow_and_update().reading;
        assert_eq!(&seen, want, "observer saw a reading that no tick produced");
    }

    generator.stop();
    command_tx.send(ControlCommand::Shutdown).await.unwrap();
    let final_state = running.await.unwrap();
    assert_eq!(final_state.reading, expected[2]);
}
