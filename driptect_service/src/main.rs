//! `driptect` - terminal flood-risk dashboard.
//!
//! Starts the synthetic telemetry generator, reads commands from stdin and
//! prints the dashboard. See `driptect_service::console` for the commands.

use std::process::ExitCode;
use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, watch};

use driptect_service::config::DashboardConfig;
use driptect_service::console::{self, Command};
use driptect_service::dashboard::{ControlCommand, Dashboard, DashboardState, RequestPhase};
use driptect_service::ingest::prediction::HttpPredictionClient;
use driptect_service::ingest::simulator::TelemetryGenerator;
use driptect_service::logging::{self, Component};

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let config = match DashboardConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = logging::init_logger(&config.logging) {
        eprintln!("✗ {}", e);
        return ExitCode::FAILURE;
    }

    let client = match HttpPredictionClient::new(&config.api.base_url, config.api.timeout()) {
        Ok(client) => client,
        Err(e) => {
            tracing::error!(component = %Component::System, error = %e, "Failed to build HTTP client");
            return ExitCode::FAILURE;
        }
    };
    tracing::info!(
        component = %Component::System,
        url = client.url(),
        timeout_ms = config.api.timeout_ms,
        "Prediction endpoint configured"
    );

    let dashboard = Dashboard::new(Arc::new(client));
    let snapshots = dashboard.subscribe();

    let (telemetry_tx, telemetry_rx) = mpsc::channel(8);
    let generator = config
        .telemetry
        .enabled
        .then(|| TelemetryGenerator::spawn(config.telemetry.interval(), telemetry_tx));

    let (command_tx, command_rx) = mpsc::channel(16);

    println!("{}", console::render(&snapshots.borrow()));
    println!("{}", console::HELP);

    tokio::spawn(read_commands(command_tx, snapshots.clone()));
    tokio::spawn(announce_outcomes(snapshots));

    let final_state = dashboard.run(telemetry_rx, command_rx).await;

    // tear the generator down before the view goes away
    if let Some(generator) = generator {
        generator.stop();
    }

    tracing::info!(
        component = %Component::System,
        connected = final_state.is_connected,
        "Shutting down"
    );
    ExitCode::SUCCESS
}

/// Reads stdin until `quit` or EOF, forwarding dashboard commands.
async fn read_commands(commands: mpsc::Sender<ControlCommand>, snapshots: watch::Receiver<DashboardState>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(component = %Component::System, error = %e, "Failed to read stdin");
                break;
            }
        };

        let command = match console::parse_command(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}\n{}", e, console::HELP);
                continue;
            }
        };

        match command {
            Command::Show => println!("{}", console::render(&snapshots.borrow())),
            Command::Help => println!("{}", console::HELP),
            _ => {}
        }

        if let Some(control) = command.to_control() {
            let quitting = control == ControlCommand::Shutdown;
            if commands.send(control).await.is_err() || quitting {
                return;
            }
        }
    }

    let _ = commands.send(ControlCommand::Shutdown).await;
}

/// Prints the status panel whenever a request starts or completes.
async fn announce_outcomes(mut snapshots: watch::Receiver<DashboardState>) {
    let mut last_marker = console::outcome_marker(&snapshots.borrow());

    while snapshots.changed().await.is_ok() {
        let state = snapshots.borrow_and_update().clone();
        let marker = console::outcome_marker(&state);
        if marker == last_marker {
            continue;
        }
        last_marker = marker;

        match state.phase {
            RequestPhase::InFlight => println!("  Analyzing..."),
            RequestPhase::Succeeded | RequestPhase::Failed => println!("{}", console::render(&state)),
            RequestPhase::Idle => {}
        }
    }
}
