//! Flood-risk status classification.
//!
//! The status panel is a pure function of the dashboard's `error` and
//! `prediction` fields. An error always wins, even when a stale prediction is
//! still held; without either the panel is neutral; otherwise only an exact
//! `prediction == 1` is high risk.

use crate::model::PredictionResult;

/// What the status panel is showing, in display priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskStatus {
    /// The last request failed.
    ConnectionError,
    /// Nothing has been predicted yet.
    NoPrediction,
    HighRisk,
    /// Any prediction value other than exactly 1.
    LowRisk,
}

/// Classifies the dashboard's (error, prediction) pair.
pub fn classify_status(error: Option<&str>, prediction: Option<&PredictionResult>) -> RiskStatus {
    if error.is_some() {
        return RiskStatus::ConnectionError;
    }
    match prediction {
        None => RiskStatus::NoPrediction,
        Some(result) if result.is_high_risk() => RiskStatus::HighRisk,
        Some(_) => RiskStatus::LowRisk,
    }
}

/// Visual tone of the status panel (icon and colour class).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Neutral,
    Danger,
    Safe,
    Error,
}

impl Tone {
    /// Console icon for the tone.
    pub fn icon(&self) -> &'static str {
        match self {
            Tone::Neutral => "·",
            Tone::Danger => "⚠",
            Tone::Safe => "✓",
            Tone::Error => "✗",
        }
    }
}

/// Everything the status panel renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusPanel {
    pub status: RiskStatus,
    pub tone: Tone,
    pub headline: String,
    pub description: String,
}

/// Builds the status panel for the given dashboard fields.
pub fn status_panel(error: Option<&str>, prediction: Option<&PredictionResult>) -> StatusPanel {
    let status = classify_status(error, prediction);

    let (tone, headline, description) = match (status, error, prediction) {
        (RiskStatus::ConnectionError, Some(err), _) => {
            (Tone::Error, "Connection Error".to_string(), err.to_string())
        }
        (RiskStatus::HighRisk, _, Some(result)) => (
            Tone::Danger,
            headline_for(result),
            "Confidence: High Risk".to_string(),
        ),
        (RiskStatus::LowRisk, _, Some(result)) => (
            Tone::Safe,
            headline_for(result),
            "Confidence: Low Risk".to_string(),
        ),
        _ => (
            Tone::Neutral,
            "No prediction available".to_string(),
            "Click \"Get Prediction\" to analyze current sensor data".to_string(),
        ),
    };

    StatusPanel {
        status,
        tone,
        headline,
        description,
    }
}

fn headline_for(result: &PredictionResult) -> String {
    if result.message.is_empty() {
        "Prediction received".to_string()
    } else {
        result.message.clone()
    }
}

/// Header badge text for the connection flag.
pub fn connection_label(is_connected: bool) -> &'static str {
    if is_connected { "Connected" } else { "Disconnected" }
}

/// Label of the manual trigger; the trigger is disabled while loading.
pub fn trigger_label(loading: bool) -> &'static str {
    if loading { "Analyzing..." } else { "Get Prediction" }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_takes_priority_over_prediction() {
        let stale = PredictionResult::new(1, "High risk");
        assert_eq!(
            classify_status(Some("timeout of 5000ms exceeded"), Some(&stale)),
            RiskStatus::ConnectionError
        );
        assert_eq!(classify_status(Some("boom"), None), RiskStatus::ConnectionError);
    }

    #[test]
    fn test_no_error_no_prediction_is_neutral() {
        let panel = status_panel(None, None);
        assert_eq!(panel.status, RiskStatus::NoPrediction);
        assert_eq!(panel.tone, Tone::Neutral);
        assert_eq!(panel.headline, "No prediction available");
    }

    #[test]
    fn test_exact_one_is_high_risk() {
        let result = PredictionResult::new(1, "High risk");
        let panel = status_panel(None, Some(&result));
        assert_eq!(panel.status, RiskStatus::HighRisk);
        assert_eq!(panel.tone, Tone::Danger);
        assert_eq!(panel.headline, "High risk");
        assert_eq!(panel.description, "Confidence: High Risk");
    }

    #[test]
    fn test_every_other_value_is_low_risk() {
        for value in [0, 2, -1, 42] {
            let result = PredictionResult::new(value, "whatever");
            assert_eq!(
                classify_status(None, Some(&result)),
                RiskStatus::LowRisk,
                "prediction {} should style as low risk",
                value
            );
        }
    }

    #[test]
    fn test_non_numeric_prediction_is_low_risk() {
        for value in [serde_json::Value::Null, "1".into(), true.into(), 0.5.into()] {
            let result = PredictionResult::new(value.clone(), "odd");
            assert_eq!(
                classify_status(None, Some(&result)),
                RiskStatus::LowRisk,
                "prediction {} should style as low risk",
                value
            );
        }
    }

    #[test]
    fn test_empty_message_gets_generic_headline() {
        let result = PredictionResult::new(0, "");
        let panel = status_panel(None, Some(&result));
        assert_eq!(panel.headline, "Prediction received");
        assert_eq!(panel.description, "Confidence: Low Risk");
    }

    #[test]
    fn test_error_panel_describes_the_error() {
        let panel = status_panel(Some("Invalid response format"), None);
        assert_eq!(panel.tone, Tone::Error);
        assert_eq!(panel.headline, "Connection Error");
        assert_eq!(panel.description, "Invalid response format");
    }

    #[test]
    fn test_labels() {
        assert_eq!(connection_label(true), "Connected");
        assert_eq!(connection_label(false), "Disconnected");
        assert_eq!(trigger_label(true), "Analyzing...");
        assert_eq!(trigger_label(false), "Get Prediction");
    }
}
