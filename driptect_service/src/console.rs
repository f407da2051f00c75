//! Line-oriented control surface and text rendering of the dashboard.
//!
//! Commands:
//!
//! ```text
//! predict | p              request a prediction for the current reading
//! set <field> <value>      move a range control (soil_moisture, rainfall,
//!                          temperature, humidity, distance)
//! show | s                 print the dashboard
//! help | ?                 print this list
//! quit | q | exit          stop the dashboard
//! ```
//!
//! A `set` value is limited to its control's range and snapped to its step,
//! as a range input would.
//! A value that does not parse as a number is passed on as NaN and silently
//! discarded by the dashboard.

use std::fmt::Write;

use chrono::Local;

use crate::alert::status::{self, StatusPanel};
use crate::analysis::conversions::{format_one_decimal, rainfall_millimeters, soil_moisture_percentage};
use crate::dashboard::{ControlCommand, DashboardState, RequestPhase};
use crate::model::SensorField;

pub const HELP: &str = "\
Commands:
  predict | p              request a prediction for the current reading
  set <field> <value>      soil_moisture 0-4095, rainfall 0-4095,
                           temperature 20-35, humidity 40-80, distance 50-250
  show | s                 print the dashboard
  help | ?                 print this list
  quit | q | exit          stop the dashboard";

/// A parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Predict,
    Set { field: SensorField, value: f64 },
    Show,
    Help,
    Quit,
}

impl Command {
    /// The dashboard message for this command, if it has one.
    pub fn to_control(&self) -> Option<ControlCommand> {
        match self {
            Command::Predict => Some(ControlCommand::RequestPrediction),
            Command::Set { field, value } => Some(ControlCommand::UpdateField {
                field: *field,
                value: field.range().clamp(*value),
            }),
            Command::Quit => Some(ControlCommand::Shutdown),
            Command::Show | Command::Help => None,
        }
    }
}

/// Parses one input line. Blank lines parse as `Show`.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(Command::Show);
    };

    match verb.to_ascii_lowercase().as_str() {
        "predict" | "p" => Ok(Command::Predict),
        "show" | "s" => Ok(Command::Show),
        "help" | "?" | "h" => Ok(Command::Help),
        "quit" | "q" | "exit" => Ok(Command::Quit),
        "set" => {
            let field = words
                .next()
                .ok_or_else(|| "usage: set <field> <value>".to_string())?
                .parse::<SensorField>()?;
            let value = words
                .next()
                .ok_or_else(|| "usage: set <field> <value>".to_string())?;
            Ok(Command::Set {
                field,
                value: value.parse::<f64>().unwrap_or(f64::NAN),
            })
        }
        other => Err(format!("unknown command: {}", other)),
    }
}

/// Identifies one step of one request: two snapshots with equal markers show
/// the same outcome. Snapshots are coalesced, so comparing phases alone can
/// miss a whole Failed -> InFlight -> Failed round.
pub fn outcome_marker(state: &DashboardState) -> (RequestPhase, u64) {
    (state.phase, state.requests_started)
}

/// Renders the full dashboard as text.
pub fn render(state: &DashboardState) -> String {
    let mut out = String::new();
    let panel = status::status_panel(state.error.as_deref(), state.prediction.as_ref());

    let _ = writeln!(out, "══ DripTect · Flood Prediction System ══════════════════════");
    let _ = write!(out, "[{}]", status::connection_label(state.is_connected));
    if let Some(at) = state.last_update {
        let _ = write!(out, "  Last update: {}", at.with_timezone(&Local).format("%H:%M:%S"));
    }
    let _ = writeln!(out);
    let _ = writeln!(out);
    out.push_str(&render_panel(&panel));
    let _ = writeln!(out, "  [{}]", status::trigger_label(state.loading()));
    let _ = writeln!(out);

    let r = &state.reading;
    let _ = writeln!(
        out,
        "  {:<14} {:>7}%    Raw: {}",
        SensorField::SoilMoisture.label(),
        format_one_decimal(soil_moisture_percentage(f64::from(r.soil_moisture))),
        r.soil_moisture
    );
    let _ = writeln!(
        out,
        "  {:<14} {:>7} mm  Raw: {}",
        SensorField::Rainfall.label(),
        format_one_decimal(rainfall_millimeters(f64::from(r.rainfall))),
        r.rainfall
    );
    let _ = writeln!(
        out,
        "  {:<14} {:>7}°C   Range: 20-35°C",
        SensorField::Temperature.label(),
        format_one_decimal(r.temperature)
    );
    let _ = writeln!(
        out,
        "  {:<14} {:>7}%    Range: 40-80%",
        SensorField::Humidity.label(),
        format_one_decimal(r.humidity)
    );
    let _ = writeln!(
        out,
        "  {:<14} {:>7} cm  Range: 50-250 cm",
        SensorField::Distance.label(),
        format_one_decimal(r.distance)
    );
    let _ = write!(out, "═══════════════════════════════════════════════════════════");
    out
}

/// Renders just the status panel (headline and description).
pub fn render_panel(panel: &StatusPanel) -> String {
    format!(
        "  {} {}\n    {}\n",
        panel.tone.icon(),
        panel.headline,
        panel.description
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
