//! Structured logging for the flood-risk dashboard.
//!
//! Events go through `tracing` with a `component` field naming the part of the
//! dashboard that emitted them. Output is stderr (the console owns stdout) or,
//! when configured, an append-only log file. `RUST_LOG` overrides the
//! configured level.

use std::fmt;
use std::fs::OpenOptions;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;
use crate::model::{PredictionError, SensorField};

// ---------------------------------------------------------------------------
// Components
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    Telemetry,
    Prediction,
    Dashboard,
    System,
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Component::Telemetry => write!(f, "telemetry"),
            Component::Prediction => write!(f, "prediction"),
            Component::Dashboard => write!(f, "dashboard"),
            Component::System => write!(f, "system"),
        }
    }
}

// ---------------------------------------------------------------------------
// Failure Classification
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureType {
    /// Expected failure - prediction server not started or unreachable
    Expected,
    /// Unexpected failure - the server answered, but wrongly
    Unexpected,
    /// Unknown - slow server, dropped connection, anything else
    Unknown,
}

impl fmt::Display for FailureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureType::Expected => write!(f, "EXPECTED"),
            FailureType::Unexpected => write!(f, "UNEXPECTED"),
            FailureType::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// ---------------------------------------------------------------------------
// Logger Setup
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to open log file {path}: {source}")]
    LogFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to install logger: {0}")]
    Install(String),
}

/// Directive used when `RUST_LOG` is not set: the configured level for both
/// the library and the `driptect` binary.
pub fn default_directive(level: &str) -> String {
    let app_name = env!("CARGO_PKG_NAME").replace('-', "_");
    format!("{app_name}={level},driptect={level}")
}

/// Installs the global subscriber. Fails if one is already installed.
pub fn init_logger(config: &LoggingConfig) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(&config.level).into());

    let installed = match &config.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| LoggingError::LogFile {
                    path: path.clone(),
                    source,
                })?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init()
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .try_init(),
    };

    installed.map_err(|e| LoggingError::Install(e.to_string()))
}

// ---------------------------------------------------------------------------
// Failure Classification Helpers
// ---------------------------------------------------------------------------

/// Classify a failed prediction request
pub fn classify_prediction_failure(err: &PredictionError) -> FailureType {
    match err {
        // Server answered but broke the contract: API change or server bug
        PredictionError::Status(_) | PredictionError::InvalidResponse => FailureType::Unexpected,
        // Nothing listening is the usual "forgot to start the server" case
        PredictionError::Transport(msg) if is_connect_failure(msg) => FailureType::Expected,
        PredictionError::Timeout { .. } | PredictionError::Transport(_) => FailureType::Unknown,
    }
}

fn is_connect_failure(message: &str) -> bool {
    let lower = message.to_ascii_lowercase();
    lower.contains("network error")
        || lower.contains("connection refused")
        || lower.contains("dns error")
}

// ---------------------------------------------------------------------------
// Structured Failure Logging
// ---------------------------------------------------------------------------

/// Log a prediction failure with automatic classification
pub fn log_prediction_failure(err: &PredictionError) {
    let failure_type = classify_prediction_failure(err);

    match failure_type {
        FailureType::Expected => tracing::debug!(
            component = %Component::Prediction,
            failure = %failure_type,
            error = %err,
            "Prediction request failed"
        ),
        FailureType::Unexpected => tracing::error!(
            component = %Component::Prediction,
            failure = %failure_type,
            error = %err,
            "Prediction request failed"
        ),
        FailureType::Unknown => tracing::warn!(
            component = %Component::Prediction,
            failure = %failure_type,
            error = %err,
            "Prediction request failed"
        ),
    }
}

/// Log a manual edit that was discarded for not being a finite number
pub fn log_discarded_edit(field: SensorField, value: f64) {
    tracing::debug!(
        component = %Component::Dashboard,
        field = %field,
        value,
        "Discarded non-finite sensor edit"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_classification() {
        let refused = PredictionError::Transport("Network Error: Connection refused (os error 111)".into());
        assert_eq!(classify_prediction_failure(&refused), FailureType::Expected);

        let result = classify_prediction_failure(&PredictionError::Status(500));
        assert_eq!(result, FailureType::Unexpected);

        let result = classify_prediction_failure(&PredictionError::InvalidResponse);
        assert_eq!(result, FailureType::Unexpected);

        let result = classify_prediction_failure(&PredictionError::Timeout { timeout_ms: 5000 });
        assert_eq!(result, FailureType::Unknown);

        let reset = PredictionError::Transport("connection reset by peer".into());
        assert_eq!(classify_prediction_failure(&reset), FailureType::Unknown);
    }

    #[test]
    fn test_default_directive_covers_library_and_binary() {
        let directive = default_directive("debug");
        assert!(directive.contains("driptect_service=debug"));
        assert!(directive.contains("driptect=debug"));
    }

    #[test]
    fn test_component_names() {
        assert_eq!(Component::Telemetry.to_string(), "telemetry");
        assert_eq!(Component::Prediction.to_string(), "prediction");
    }
}
