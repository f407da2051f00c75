//! Flood-risk prediction service client.
//!
//! The service exposes a single endpoint:
//!
//! ```text
//! POST {base_url}/predict
//! Content-Type: application/json
//!
//! {"soil_moisture": 2048, "rainfall": 2048, "temperature": 25.0,
//!  "humidity": 60.0, "distance": 150.0}
//! ```
//!
//! and answers `{"prediction": 0|1, "message": "..."}`. A body without a
//! `prediction` key, a non-2xx status, or no answer within the timeout is a
//! failure.
//!
//! [`PredictionClient`] is the seam the dashboard talks to; the HTTP
//! implementation lives here, tests substitute their own.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::model::{PredictionError, PredictionResult, SensorReading};

/// Path of the prediction endpoint under the configured base URL.
pub const PREDICT_PATH: &str = "/predict";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

/// Something that can classify a reading into a flood-risk prediction.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn predict(&self, reading: &SensorReading) -> Result<PredictionResult, PredictionError>;
}

/// reqwest-backed client for the prediction endpoint.
#[derive(Debug, Clone)]
pub struct HttpPredictionClient {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

impl HttpPredictionClient {
    /// Builds a client for `{base_url}/predict`.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, PredictionError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| PredictionError::Transport(e.to_string()))?;

        Ok(Self {
            client,
            url: build_predict_url(base_url),
            timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    fn map_error(&self, err: reqwest::Error) -> PredictionError {
        if err.is_timeout() {
            PredictionError::Timeout {
                timeout_ms: self.timeout.as_millis() as u64,
            }
        } else if let Some(status) = err.status() {
            PredictionError::Status(status.as_u16())
        } else {
            PredictionError::Transport(describe_transport_error(&err))
        }
    }
}

#[async_trait]
impl PredictionClient for HttpPredictionClient {
    async fn predict(&self, reading: &SensorReading) -> Result<PredictionResult, PredictionError> {
        let response = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .header("Accept", "application/json")
            .json(reading)
            .send()
            .await
            .map_err(|e| self.map_error(e))?;

        if !response.status().is_success() {
            return Err(PredictionError::Status(response.status().as_u16()));
        }

        let body = response.text().await.map_err(|e| self.map_error(e))?;
        parse_prediction_body(&body)
    }
}

/// Joins the base URL and the endpoint path, tolerating a trailing slash.
pub fn build_predict_url(base_url: &str) -> String {
    format!("{}{}", base_url.trim().trim_end_matches('/'), PREDICT_PATH)
}

/// Validates a 2xx response body.
///
/// The only schema requirement is a JSON object with a `prediction` key.
/// Whatever that key holds (null, a string, a fraction) is accepted as-is;
/// unparseable JSON, a non-object or a missing key collapse into
/// [`PredictionError::InvalidResponse`]. A missing or non-string `message`
/// becomes an empty string.
pub fn parse_prediction_body(body: &str) -> Result<PredictionResult, PredictionError> {
    let json: Value = serde_json::from_str(body).map_err(|_| PredictionError::InvalidResponse)?;

    let prediction = json
        .get("prediction")
        .cloned()
        .ok_or(PredictionError::InvalidResponse)?;

    let message = json
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Ok(PredictionResult { prediction, message })
}

/// Innermost cause of a transport error, which is the part worth showing
/// ("Connection refused (os error 111)") rather than reqwest's wrapper text.
fn describe_transport_error(err: &reqwest::Error) -> String {
    let mut source: &dyn std::error::Error = err;
    while let Some(next) = source.source() {
        source = next;
    }
    let message = source.to_string();
    if err.is_connect() {
        format!("Network Error: {}", message)
    } else {
        message
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
